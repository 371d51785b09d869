use std::sync::{Arc, Mutex};

use crate::kernel::context::HostContext;
use crate::kernel::extensions::ExtensionRegistry;

#[derive(Debug, Default)]
struct FeatureList(Mutex<Vec<String>>);

#[derive(Debug, PartialEq)]
struct Port(u16);

#[test]
fn test_register_and_get_by_type() {
    let mut registry = ExtensionRegistry::new();
    assert!(registry.is_empty());

    assert!(registry.register(Arc::new(Port(8080))).is_none());
    registry.register(Arc::new(FeatureList::default()));

    assert_eq!(registry.len(), 2);
    assert!(registry.contains::<Port>());
    assert_eq!(*registry.get::<Port>().unwrap(), Port(8080));
    assert!(registry.get::<String>().is_none());
}

#[test]
fn test_register_replaces_previous_value() {
    let mut registry = ExtensionRegistry::new();
    registry.register(Arc::new(Port(1)));
    let previous = registry.register(Arc::new(Port(2))).expect("previous value returned");
    assert_eq!(*previous, Port(1));
    assert_eq!(*registry.get::<Port>().unwrap(), Port(2));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_remove_and_clear() {
    let mut registry = ExtensionRegistry::new();
    registry.register(Arc::new(Port(1)));
    registry.register(Arc::new(FeatureList::default()));

    assert_eq!(*registry.remove::<Port>().unwrap(), Port(1));
    assert!(!registry.contains::<Port>());
    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn test_shared_value_is_visible_through_context() {
    let features = Arc::new(FeatureList::default());
    let mut extensions = ExtensionRegistry::new();
    extensions.register(features.clone());

    let context = HostContext::with_extensions(extensions).into_shared();
    {
        let guard = context.read().unwrap();
        let list = guard.extensions().get::<FeatureList>().unwrap();
        list.0.lock().unwrap().push("alpha".to_string());
    }

    assert_eq!(*features.0.lock().unwrap(), vec!["alpha".to_string()]);
}
