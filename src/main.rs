mod app;
mod ui;

use adw::Application;
use adw::prelude::*;

fn main() -> glib::ExitCode {
    foodrelief::utils::init_logging();

    let app = Application::builder()
        .application_id("org.foodrelief.FoodRelief")
        .build();
    app.connect_activate(|app| {
        crate::app::build_ui(app);
    });
    app.run()
}
