use std::ffi::OsString;
use std::path::Path;

use crate::kernel::context::HostContext;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::ffi::{LOAD_SYMBOL, UNLOAD_SYMBOL};
use crate::plugin_system::loader::ModuleLoader;
use crate::plugin_system::static_loader::{StaticModuleLoader, StaticPlugin};

#[test]
fn test_module_file_is_named_after_plugin() {
    let loader = StaticModuleLoader::new();
    assert_eq!(loader.module_file_name("alpha"), OsString::from("alpha"));
}

#[test]
fn test_open_unregistered_plugin_fails() {
    let loader = StaticModuleLoader::new();
    match loader.open("ghost", Path::new("/plugins/ghost/ghost")) {
        Err(PluginSystemError::ModuleOpen { plugin, path, .. }) => {
            assert_eq!(plugin, "ghost");
            assert_eq!(path, Path::new("/plugins/ghost/ghost"));
        }
        Err(other) => panic!("Expected ModuleOpen, got {:?}", other),
        Ok(_) => panic!("Expected ModuleOpen, got a module"),
    }
    assert_eq!(loader.opened_modules(), 0);
}

#[test]
fn test_resolve_registered_entry_points() {
    let loader = StaticModuleLoader::new();
    loader.register(
        "alpha",
        StaticPlugin::new()
            .with_load(|ctx| ctx.menu_mut().add_item("alpha", "Alpha", "/alpha").map_err(|e| e.to_string()))
            .with_unload(|ctx| {
                ctx.menu_mut().remove_app("alpha");
                Ok(())
            }),
    );

    let module = loader.open("alpha", Path::new("alpha")).unwrap();
    let load = module.resolve(LOAD_SYMBOL).expect("load registered");
    let unload = module.resolve(UNLOAD_SYMBOL).expect("unload registered");
    assert!(module.resolve("init").is_none());

    let mut context = HostContext::new();
    load(&mut context).unwrap();
    assert!(context.menu().entries("alpha").is_some());
    unload(&mut context).unwrap();
    assert!(context.menu().is_empty());
}

#[test]
fn test_live_module_accounting() {
    let loader = StaticModuleLoader::new();
    loader.register("alpha", StaticPlugin::new());
    loader.register("beta", StaticPlugin::new());

    let alpha = loader.open("alpha", Path::new("alpha")).unwrap();
    let beta = loader.open("beta", Path::new("beta")).unwrap();
    assert_eq!(loader.live_modules(), 2);
    drop(alpha);
    assert_eq!(loader.live_modules(), 1);
    drop(beta);
    assert_eq!(loader.live_modules(), 0);
    assert_eq!(loader.peak_live_modules(), 2);
    assert_eq!(loader.opened_modules(), 2);
}

#[test]
fn test_clones_share_registrations() {
    let loader = StaticModuleLoader::new();
    let owned_by_supervisor = loader.clone();
    loader.register("alpha", StaticPlugin::new());

    assert!(owned_by_supervisor.open("alpha", Path::new("alpha")).is_ok());
    assert!(loader.unregister("alpha").is_some());
    assert!(owned_by_supervisor.open("alpha", Path::new("alpha")).is_err());
}
