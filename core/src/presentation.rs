//! Headless model of the map screen.
//!
//! [`MapView`] is the state the host renders: markers, camera region, the
//! pending dialog. [`MapScreen`] turns gestures and dialog answers into
//! coordinator calls and receives the coordinator's notifications back
//! through a [`MapDelegate`] bound to its view.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::coordinator::{Coordinator, MapDelegate};
use crate::error::{PinError, StoreError};
use crate::location::{AuthorizationStatus, LocationService};
use crate::models::{Annotation, Coordinate, LocationFix, Pin, Region};
use crate::storage::PinStore;

pub const PIN_REUSE_IDENTIFIER: &str = "pinAnnotation";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState {
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerStyle {
    DropPin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalloutAccessory {
    DetailDisclosure,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerView {
    pub reuse_identifier: &'static str,
    pub style: MarkerStyle,
    pub can_show_callout: bool,
    pub right_accessory: Option<CalloutAccessory>,
    pub annotation: Annotation,
}

impl MarkerView {
    fn new(annotation: Annotation) -> Self {
        Self {
            reuse_identifier: PIN_REUSE_IDENTIFIER,
            style: MarkerStyle::DropPin,
            can_show_callout: true,
            right_accessory: Some(CalloutAccessory::DetailDisclosure),
            annotation,
        }
    }
}

/// Idle marker views keyed by reuse identifier.
#[derive(Debug, Default)]
pub struct MarkerPool {
    idle: HashMap<&'static str, Vec<MarkerView>>,
    created: usize,
}

impl MarkerPool {
    pub fn dequeue(&mut self, identifier: &str) -> Option<MarkerView> {
        self.idle.get_mut(identifier).and_then(Vec::pop)
    }

    pub fn enqueue(&mut self, view: MarkerView) {
        self.idle.entry(view.reuse_identifier).or_default().push(view);
    }

    pub fn idle_count(&self, identifier: &str) -> usize {
        self.idle.get(identifier).map_or(0, Vec::len)
    }

    /// Views built from scratch because the pool was empty.
    pub fn created(&self) -> usize {
        self.created
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogAction {
    Ok,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetailDialog {
    pub title: String,
    pub message: String,
    pub actions: Vec<DialogAction>,
}

/// Details dialog for a selected marker. Only user pins can be deleted.
pub fn pin_details(annotation: Annotation) -> DetailDialog {
    let mut actions = vec![DialogAction::Ok];
    if !annotation.is_user_location() {
        actions.push(DialogAction::Delete);
    }
    DetailDialog {
        title: "Pin Details".to_string(),
        message: format!(
            "Coordinates: {}, {}\nTitle: {}",
            annotation.coordinate.latitude, annotation.coordinate.longitude, annotation.title
        ),
        actions,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingDialog {
    pub dialog: DetailDialog,
    pub annotation: Annotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameRequest {
    pub title: &'static str,
    pub message: &'static str,
    pub placeholder: &'static str,
}

impl NameRequest {
    pub const NEW_PIN: NameRequest = NameRequest {
        title: "Add a Name",
        message: "Enter a name for the new pin",
        placeholder: "Pin Name",
    };
}

/// Modal text input. `None` means the user cancelled.
pub trait NamePrompt {
    fn request_name(&mut self, request: &NameRequest) -> Option<String>;
}

impl<F> NamePrompt for F
where
    F: FnMut(&NameRequest) -> Option<String>,
{
    fn request_name(&mut self, request: &NameRequest) -> Option<String> {
        self(request)
    }
}

#[derive(Debug)]
pub struct MapView {
    viewport: ViewportSize,
    camera: Region,
    initial_fix_applied: bool,
    initial_span_meters: f64,
    user_location_title: String,
    markers: Vec<MarkerView>,
    pool: MarkerPool,
    pending_dialog: Option<PendingDialog>,
}

impl MapView {
    pub fn new(config: &CoreConfig, viewport: ViewportSize) -> Self {
        Self {
            viewport,
            camera: Region::world(),
            initial_fix_applied: false,
            initial_span_meters: config.initial_span_meters,
            user_location_title: config.user_location_title.clone(),
            markers: Vec::new(),
            pool: MarkerPool::default(),
            pending_dialog: None,
        }
    }

    pub fn camera(&self) -> Region {
        self.camera
    }

    pub fn set_camera(&mut self, region: Region) {
        self.camera = region;
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
    }

    pub fn markers(&self) -> &[MarkerView] {
        &self.markers
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.markers.iter().map(|m| &m.annotation)
    }

    pub fn pool(&self) -> &MarkerPool {
        &self.pool
    }

    pub fn pending_dialog(&self) -> Option<&PendingDialog> {
        self.pending_dialog.as_ref()
    }

    /// Maps a point in the viewport onto the visible region.
    pub fn convert_point(&self, point: ScreenPoint) -> Coordinate {
        let Region { center, span } = self.camera;
        let fx = if self.viewport.width > 0.0 {
            point.x / self.viewport.width
        } else {
            0.5
        };
        let fy = if self.viewport.height > 0.0 {
            point.y / self.viewport.height
        } else {
            0.5
        };
        Coordinate::new(
            (center.latitude + (0.5 - fy) * span.latitude_delta).clamp(-90.0, 90.0),
            wrap_longitude(center.longitude + (fx - 0.5) * span.longitude_delta),
        )
    }

    /// Dequeues a pooled view when one is idle. The annotation is always
    /// re-applied since pooled views carry their previous one.
    pub fn view_for(&mut self, annotation: Annotation) -> MarkerView {
        match self.pool.dequeue(PIN_REUSE_IDENTIFIER) {
            Some(mut view) => {
                view.annotation = annotation;
                view
            }
            None => {
                self.pool.created += 1;
                MarkerView::new(annotation)
            }
        }
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        let view = self.view_for(annotation);
        self.markers.push(view);
    }

    pub fn remove_annotation(&mut self, annotation: &Annotation) -> bool {
        let Some(index) = self.markers.iter().position(|m| {
            m.annotation.pin_id == annotation.pin_id
                && (annotation.pin_id.is_some() || m.annotation == *annotation)
        }) else {
            return false;
        };
        let view = self.markers.remove(index);
        self.pool.enqueue(view);
        true
    }

    /// Centers on the first fix only. Returns whether the camera moved.
    pub fn apply_location_update(&mut self, coordinate: Coordinate) -> bool {
        if self.initial_fix_applied {
            return false;
        }
        self.add_annotation(Annotation::user_location(
            coordinate,
            self.user_location_title.clone(),
        ));
        self.camera = Region::from_meters(
            coordinate,
            self.initial_span_meters,
            self.initial_span_meters,
        );
        self.initial_fix_applied = true;
        true
    }

    pub fn present_details(&mut self, annotation: Annotation) {
        self.pending_dialog = Some(PendingDialog {
            dialog: pin_details(annotation.clone()),
            annotation,
        });
    }

    pub fn take_pending_dialog(&mut self) -> Option<PendingDialog> {
        self.pending_dialog.take()
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}

fn lock(view: &Mutex<MapView>) -> MutexGuard<'_, MapView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ViewDelegate {
    view: Arc<Mutex<MapView>>,
}

impl MapDelegate for ViewDelegate {
    fn on_location_update(&self, coordinate: Coordinate) {
        if lock(&self.view).apply_location_update(coordinate) {
            debug!(?coordinate, "centered map on first location fix");
        }
    }

    fn on_annotation_selected(&self, annotation: Annotation) {
        lock(&self.view).present_details(annotation);
    }

    fn on_annotation_loaded(&self, annotation: Annotation) {
        lock(&self.view).add_annotation(annotation);
    }
}

pub struct MapScreen<S, L> {
    view: Arc<Mutex<MapView>>,
    coordinator: Option<Coordinator<S, L>>,
}

impl<S: PinStore, L: LocationService> MapScreen<S, L> {
    /// Builds the screen. The coordinator only exists when location
    /// services are enabled; otherwise the screen stays an empty map.
    pub fn load(config: CoreConfig, viewport: ViewportSize, store: S, location: L) -> Self {
        let view = Arc::new(Mutex::new(MapView::new(&config, viewport)));
        if !location.services_enabled() {
            info!("location services are not enabled");
            return Self {
                view,
                coordinator: None,
            };
        }

        let mut coordinator = Coordinator::new(store, location, config);
        coordinator.set_delegate(Box::new(ViewDelegate { view: view.clone() }));
        if let Err(err) = coordinator.setup() {
            debug!(error = %err, "saved pins not loaded");
        }
        coordinator.request_location_authorization();
        Self {
            view,
            coordinator: Some(coordinator),
        }
    }

    pub fn view(&self) -> MutexGuard<'_, MapView> {
        lock(&self.view)
    }

    pub fn coordinator(&self) -> Option<&Coordinator<S, L>> {
        self.coordinator.as_ref()
    }

    /// Prompts for a name and creates a pin at the pressed point. Cancel or
    /// an empty name yields `Ok(None)`. The marker is drawn only after the
    /// pin is stored.
    pub fn handle_long_press(
        &mut self,
        state: GestureState,
        point: ScreenPoint,
        prompt: &mut dyn NamePrompt,
    ) -> Result<Option<Pin>, PinError> {
        if state != GestureState::Began {
            return Ok(None);
        }
        let Some(coordinator) = self.coordinator.as_mut() else {
            warn!("long press ignored, location services unavailable");
            return Err(PinError::CoordinatorUnavailable);
        };

        let coordinate = lock(&self.view).convert_point(point);
        let name = match prompt.request_name(&NameRequest::NEW_PIN) {
            Some(name) if !name.is_empty() => name,
            _ => {
                debug!("pin creation cancelled");
                return Ok(None);
            }
        };

        let pin = coordinator.save_pin(coordinate, &name)?;
        lock(&self.view).add_annotation(pin.annotation());
        Ok(Some(pin))
    }

    pub fn handle_location_update(&self, fixes: &[LocationFix]) {
        if let Some(coordinator) = &self.coordinator {
            coordinator.on_location_update(fixes);
        }
    }

    pub fn handle_authorization_change(&self, status: AuthorizationStatus) {
        if let Some(coordinator) = &self.coordinator {
            coordinator.on_authorization_changed(status);
        }
    }

    pub fn handle_callout_tapped(&self, annotation: Annotation) {
        if let Some(coordinator) = &self.coordinator {
            coordinator.select_annotation(annotation);
        }
    }

    /// Answers the pending details dialog. `Delete` removes the pin from the
    /// store and then its marker; a store failure leaves the marker in place.
    pub fn respond_to_dialog(&mut self, action: DialogAction) -> Result<(), StoreError> {
        let Some(pending) = lock(&self.view).take_pending_dialog() else {
            return Ok(());
        };
        if action != DialogAction::Delete {
            return Ok(());
        }
        let Some(pin_id) = pending.annotation.pin_id.clone() else {
            warn!("delete requested for the user location marker");
            return Ok(());
        };
        let Some(coordinator) = self.coordinator.as_mut() else {
            return Err(StoreError::Unavailable("no coordinator".to_string()));
        };

        coordinator.delete_record(&pin_id)?;
        lock(&self.view).remove_annotation(&pending.annotation);
        Ok(())
    }

    pub fn shutdown(self) -> Result<(), StoreError> {
        match self.coordinator {
            Some(coordinator) => coordinator.shutdown(),
            None => Ok(()),
        }
    }
}
