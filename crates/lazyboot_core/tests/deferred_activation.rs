use lazyboot_core::{
    descriptors_from, ActivationError, BootError, DispatchError, EventBus, FactoryError,
    ManifestStore, ModuleActivator, ModuleBoot, ModuleDescriptor, ModuleFactory, ModuleInstance,
    ModuleManifest, ModuleRegistrar, OnceRegistrar,
};
use std::sync::{Arc, Mutex};

struct Probe {
    deferred: bool,
    provides: &'static [&'static str],
    when: &'static [&'static str],
}

impl ModuleInstance for Probe {
    fn is_deferred(&self) -> bool {
        self.deferred
    }

    fn provides(&self) -> Vec<String> {
        self.provides.iter().map(|v| v.to_string()).collect()
    }

    fn when(&self) -> Vec<String> {
        self.when.iter().map(|v| v.to_string()).collect()
    }
}

/// A and C eager; B deferred behind `boot.reports`; M deferred behind two events.
struct AppFactory;

impl ModuleFactory for AppFactory {
    fn instantiate(
        &self,
        descriptor: &ModuleDescriptor,
    ) -> Result<Box<dyn ModuleInstance>, FactoryError> {
        let probe = match descriptor.as_str() {
            "A" | "C" => Probe {
                deferred: false,
                provides: &[],
                when: &[],
            },
            "B" => Probe {
                deferred: true,
                provides: &["reports"],
                when: &["boot.reports"],
            },
            "M" => Probe {
                deferred: true,
                provides: &["mailer"],
                when: &["boot.mail", "queue.start"],
            },
            "Q" => Probe {
                deferred: true,
                provides: &["queue"],
                when: &[],
            },
            _ => return Err(FactoryError::UnknownDescriptor(descriptor.clone())),
        };
        Ok(Box::new(probe))
    }
}

#[derive(Default)]
struct RecordingRegistrar {
    calls: Mutex<Vec<String>>,
    refuse: Option<&'static str>,
}

impl RecordingRegistrar {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }
}

impl ModuleRegistrar for RecordingRegistrar {
    fn activate(&self, descriptor: &ModuleDescriptor) -> Result<(), ActivationError> {
        if self.refuse == Some(descriptor.as_str()) {
            return Err(ActivationError::failed(descriptor, "refused by test"));
        }
        self.calls
            .lock()
            .expect("calls lock")
            .push(descriptor.to_string());
        Ok(())
    }
}

fn boot(
    dir: &tempfile::TempDir,
    registrar: Arc<RecordingRegistrar>,
) -> ModuleBoot<AppFactory, RecordingRegistrar> {
    ModuleBoot::new(
        AppFactory,
        ManifestStore::new(dir.path().join("modules.json")),
        registrar,
    )
}

#[test]
fn trigger_event_activates_deferred_module_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "B", "C"]).expect("valid list");

    let outcome = boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect("boot");

    assert_eq!(registrar.calls(), vec!["A", "C"]);
    assert_eq!(
        outcome.deferred.owner_of("reports").map(ModuleDescriptor::as_str),
        Some("B")
    );

    let invoked = events.fire("boot.reports", &[]).expect("fire");
    assert_eq!(invoked, 1);
    assert_eq!(registrar.count("B"), 1);
    assert_eq!(registrar.calls(), vec!["A", "C", "B"]);
}

#[test]
fn unrelated_events_do_not_activate_anything() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "B", "C"]).expect("valid list");
    boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect("boot");

    assert_eq!(events.fire("boot.mail", &[]).expect("fire"), 0);
    assert_eq!(events.fire("boot.reports.extra", &[]).expect("fire"), 0);
    assert_eq!(registrar.count("B"), 0);
}

#[test]
fn each_trigger_occurrence_calls_the_registrar() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["M"]).expect("valid list");
    boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect("boot");

    events.fire("boot.mail", &[]).expect("fire");
    events.fire("queue.start", &[]).expect("fire");
    assert_eq!(registrar.count("M"), 2);

    events.fire("boot.mail", &[]).expect("fire");
    assert_eq!(registrar.count("M"), 3);
}

#[test]
fn once_registrar_dedupes_repeated_triggers() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(OnceRegistrar::new(RecordingRegistrar::default()));
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "M"]).expect("valid list");

    let boot = ModuleBoot::new(
        AppFactory,
        ManifestStore::new(dir.path().join("modules.json")),
        Arc::clone(&registrar),
    );
    let mut outcome = boot.load(&inputs, &events).expect("boot");

    events.fire("boot.mail", &[]).expect("fire");
    events.fire("queue.start", &[]).expect("fire");
    assert!(outcome
        .deferred
        .resolve("mailer", registrar.as_ref())
        .expect("resolve"));

    assert_eq!(registrar.inner().calls(), vec!["A", "M"]);
    assert!(registrar.is_active(
        &ModuleDescriptor::new("M").expect("valid descriptor")
    ));
}

#[test]
fn deferred_module_without_triggers_waits_for_capability_request() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "Q"]).expect("valid list");

    let mut outcome = boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect("boot");
    assert_eq!(registrar.calls(), vec!["A"]);
    assert!(outcome.deferred.is_deferred("queue"));

    assert!(outcome
        .deferred
        .resolve("queue", registrar.as_ref())
        .expect("resolve"));
    assert_eq!(registrar.calls(), vec!["A", "Q"]);
    assert!(!outcome.deferred.is_deferred("queue"));
    assert!(!outcome
        .deferred
        .resolve("queue", registrar.as_ref())
        .expect("second resolve"));
}

#[test]
fn eager_modules_activate_in_manifest_order() {
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["C", "A"]).expect("valid list");

    let mut manifest = ModuleManifest::fresh(&inputs);
    manifest.eager = inputs.clone();

    ModuleActivator::new(Arc::clone(&registrar))
        .activate(&manifest, &events)
        .expect("activate");
    assert_eq!(registrar.calls(), vec!["C", "A"]);
}

#[test]
fn empty_trigger_list_arms_no_listener() {
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let q = ModuleDescriptor::new("Q").expect("valid descriptor");

    let mut manifest = ModuleManifest::fresh(std::slice::from_ref(&q));
    manifest.triggers.insert(q.clone(), Vec::new());
    manifest.deferred.insert("queue".to_string(), q);

    let deferred = ModuleActivator::new(Arc::clone(&registrar))
        .activate(&manifest, &events)
        .expect("activate");
    assert!(!events.has_listeners("queue"));
    assert!(registrar.calls().is_empty());
    assert_eq!(deferred.capabilities(), vec!["queue"]);
}

#[test]
fn trigger_fired_by_eager_module_reaches_deferred_target() {
    struct ChainRegistrar {
        events: Arc<EventBus<()>>,
        calls: Mutex<Vec<String>>,
    }

    impl ModuleRegistrar for ChainRegistrar {
        fn activate(&self, descriptor: &ModuleDescriptor) -> Result<(), ActivationError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(descriptor.to_string());
            if descriptor.as_str() == "A" {
                self.events
                    .fire("boot.reports", &[])
                    .map_err(|err| ActivationError::failed(descriptor, err.to_string()))?;
            }
            Ok(())
        }
    }

    let events = Arc::new(EventBus::<()>::new());
    let registrar = Arc::new(ChainRegistrar {
        events: Arc::clone(&events),
        calls: Mutex::new(Vec::new()),
    });
    let mut manifest =
        ModuleManifest::fresh(&descriptors_from(["A", "B"]).expect("valid list"));
    let b = ModuleDescriptor::new("B").expect("valid descriptor");
    manifest.eager = vec![ModuleDescriptor::new("A").expect("valid descriptor")];
    manifest
        .triggers
        .insert(b.clone(), vec!["boot.reports".to_string()]);
    manifest.deferred.insert("reports".to_string(), b);

    ModuleActivator::new(Arc::clone(&registrar))
        .activate(&manifest, &*events)
        .expect("activate");
    assert_eq!(
        *registrar.calls.lock().expect("calls lock"),
        vec!["A".to_string(), "B".to_string()]
    );
}

#[test]
fn eager_activation_failure_aborts_boot() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar {
        refuse: Some("A"),
        ..RecordingRegistrar::default()
    });
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "C"]).expect("valid list");

    let err = boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect_err("refused activation must abort");
    assert!(matches!(
        err,
        BootError::Dispatch(DispatchError::Activation(ActivationError::Failed { .. }))
    ));
    assert!(registrar.calls().is_empty());
}

#[test]
fn deferred_activation_failure_surfaces_from_fire() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar {
        refuse: Some("B"),
        ..RecordingRegistrar::default()
    });
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["B"]).expect("valid list");
    boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect("boot");

    let err = events
        .fire("boot.reports", &[])
        .expect_err("activation failure must propagate");
    assert!(err.to_string().contains("refused by test"));
}

#[test]
fn unknown_module_fails_boot_at_compile() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "Z"]).expect("valid list");

    let err = boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect_err("unknown module must fail");
    assert!(matches!(err, BootError::Compile(_)));
    assert!(registrar.calls().is_empty());
}

#[test]
fn cached_manifest_boots_identically_on_second_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let inputs = descriptors_from(["A", "B", "C"]).expect("valid list");

    let first_registrar = Arc::new(RecordingRegistrar::default());
    let first = boot(&dir, Arc::clone(&first_registrar))
        .load(&inputs, &EventBus::<()>::new())
        .expect("first boot");

    let second_registrar = Arc::new(RecordingRegistrar::default());
    let second_events = EventBus::<()>::new();
    let second = boot(&dir, Arc::clone(&second_registrar))
        .load(&inputs, &second_events)
        .expect("second boot");

    assert_eq!(first.manifest, second.manifest);
    assert_eq!(first_registrar.calls(), second_registrar.calls());
    second_events.fire("boot.reports", &[]).expect("fire");
    assert_eq!(second_registrar.count("B"), 1);
}

#[test]
fn resolve_all_activates_remaining_deferred_modules() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registrar = Arc::new(RecordingRegistrar::default());
    let events = EventBus::<()>::new();
    let inputs = descriptors_from(["A", "B", "M", "Q"]).expect("valid list");

    let mut outcome = boot(&dir, Arc::clone(&registrar))
        .load(&inputs, &events)
        .expect("boot");
    let activated = outcome
        .deferred
        .resolve_all(registrar.as_ref())
        .expect("resolve all");

    // Capability order: mailer, queue, reports.
    let names: Vec<&str> = activated.iter().map(ModuleDescriptor::as_str).collect();
    assert_eq!(names, vec!["M", "Q", "B"]);
    assert!(outcome.deferred.is_empty());
}
