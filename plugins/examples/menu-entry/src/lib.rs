//! Example plugin: registers a "Hello" page in the application menu while
//! it is loaded.
use nubilo_core::HostContext;
use nubilo_core::kernel::MenuError;

const APP: &str = "menu_entry";

fn on_load(ctx: &mut HostContext) -> Result<(), MenuError> {
    ctx.logger().info("menu_entry: adding menu item");
    ctx.menu_mut().add_item(APP, "Hello", "/hello")
}

fn on_unload(ctx: &mut HostContext) -> Result<(), MenuError> {
    ctx.logger().info("menu_entry: removing menu item");
    ctx.menu_mut().remove_app(APP);
    Ok(())
}

nubilo_core::export_plugin!(load = on_load, unload = on_unload);
