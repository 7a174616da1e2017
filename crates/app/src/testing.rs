//! In-memory port fakes shared by the service tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use zonelight_domain::error::ZonelightError;
use zonelight_domain::event::SceneEvent;
use zonelight_domain::id::ZoneId;
use zonelight_domain::light::{AttributeValue, Attributes, LightId, LightState};
use zonelight_domain::snapshot::SceneSnapshot;
use zonelight_domain::zone::ZoneState;

use crate::ports::{EventPublisher, LightControl, NamedSnapshotStore, ZoneStateStore};

#[derive(Debug, Clone, PartialEq)]
pub enum LightCall {
    TurnOn(Vec<LightId>, Attributes),
    TurnOff(Vec<LightId>),
}

#[derive(Default)]
pub struct FakeLights {
    pub states: Mutex<BTreeMap<LightId, LightState>>,
    pub calls: Mutex<Vec<LightCall>>,
    pub reads: AtomicUsize,
}

impl FakeLights {
    pub fn with(lights: &[(&str, LightState)]) -> Self {
        let states = lights
            .iter()
            .map(|(id, state)| ((*id).to_string(), state.clone()))
            .collect();
        Self {
            states: Mutex::new(states),
            calls: Mutex::default(),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, light: &str, state: LightState) {
        self.states.lock().unwrap().insert(light.to_string(), state);
    }

    pub fn calls(&self) -> Vec<LightCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `get_state` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl LightControl for FakeLights {
    fn turn_on(
        &self,
        lights: Vec<LightId>,
        attributes: Attributes,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        {
            let mut states = self.states.lock().unwrap();
            for light in &lights {
                let state = states.entry(light.clone()).or_default();
                state.state = zonelight_domain::light::PowerState::On;
                state.attributes.extend(attributes.clone());
            }
        }
        self.calls
            .lock()
            .unwrap()
            .push(LightCall::TurnOn(lights, attributes));
        async { Ok(()) }
    }

    fn turn_off(
        &self,
        lights: Vec<LightId>,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        {
            let mut states = self.states.lock().unwrap();
            for light in &lights {
                states.entry(light.clone()).or_default().state =
                    zonelight_domain::light::PowerState::Off;
            }
        }
        self.calls.lock().unwrap().push(LightCall::TurnOff(lights));
        async { Ok(()) }
    }

    fn get_state(
        &self,
        light: &str,
    ) -> impl Future<Output = Result<Option<LightState>, ZonelightError>> + Send {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let state = self.states.lock().unwrap().get(light).cloned();
        async { Ok(state) }
    }
}

#[derive(Default)]
pub struct SpyPublisher {
    pub events: Mutex<Vec<SceneEvent>>,
}

impl SpyPublisher {
    pub fn events(&self) -> Vec<SceneEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for SpyPublisher {
    fn publish(&self, event: SceneEvent) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}

#[derive(Default)]
pub struct MemorySnapshots {
    pub saved: Mutex<HashMap<String, SceneSnapshot>>,
}

impl NamedSnapshotStore for MemorySnapshots {
    fn save(
        &self,
        name: &str,
        snapshot: SceneSnapshot,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        self.saved
            .lock()
            .unwrap()
            .insert(name.to_string(), snapshot);
        async { Ok(()) }
    }

    fn load(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<SceneSnapshot>, ZonelightError>> + Send {
        let snapshot = self.saved.lock().unwrap().get(name).cloned();
        async { Ok(snapshot) }
    }
}

#[derive(Default)]
pub struct MemoryStates {
    pub states: Mutex<HashMap<ZoneId, ZoneState>>,
}

impl MemoryStates {
    pub fn get(&self, zone: ZoneId) -> Option<ZoneState> {
        self.states.lock().unwrap().get(&zone).cloned()
    }
}

impl ZoneStateStore for MemoryStates {
    fn load(
        &self,
        zone: ZoneId,
    ) -> impl Future<Output = Result<Option<ZoneState>, ZonelightError>> + Send {
        let state = self.get(zone);
        async { Ok(state) }
    }

    fn save(
        &self,
        zone: ZoneId,
        state: ZoneState,
    ) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        self.states.lock().unwrap().insert(zone, state);
        async { Ok(()) }
    }

    fn delete(&self, zone: ZoneId) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        self.states.lock().unwrap().remove(&zone);
        async { Ok(()) }
    }
}

pub fn lit(brightness: i64) -> LightState {
    let mut attributes = Attributes::new();
    attributes.insert("brightness".to_string(), AttributeValue::Int(brightness));
    attributes.insert(
        "friendly_name".to_string(),
        AttributeValue::String("lamp".to_string()),
    );
    LightState::on(attributes)
}
