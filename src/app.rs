use adw::Application;
use adw::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use foodrelief::realtime::{NotificationCenter, RealtimeHandle, RealtimeService};
use foodrelief::screens::SharedApi;
use foodrelief::storage::FileTokenStore;
use foodrelief::utils::RUNTIME;
use foodrelief::{ApiClient, Config, Session};

/// Everything the windows share. Lives on the GTK thread.
pub struct AppContext {
    pub config: Config,
    pub session: Session,
    pub api: SharedApi,
    pub notifications: NotificationCenter,
    realtime: RefCell<Option<RealtimeHandle>>,
}

impl AppContext {
    pub fn init() -> foodrelief::Result<Rc<Self>> {
        let config = Config::load()?;
        let store = FileTokenStore::default_location()?;
        let session = Session::restore(Arc::new(store))?;
        let api: SharedApi = Arc::new(ApiClient::from_config(&config, session.clone())?);
        let notifications = NotificationCenter::default();

        let realtime =
            RealtimeService::start(RUNTIME.handle(), &config, &session, notifications.clone());

        Ok(Rc::new(Self {
            config,
            session,
            api,
            notifications,
            realtime: RefCell::new(Some(realtime)),
        }))
    }

    /// Closes the push channel. Called once when the application shuts down.
    pub fn shutdown(&self) {
        if let Some(handle) = self.realtime.borrow_mut().take() {
            RUNTIME.block_on(handle.shutdown());
        }
    }
}

pub fn build_ui(app: &Application) {
    let ctx = match AppContext::init() {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("Startup failed: {e}");
            crate::ui::widgets::show_fatal(app, &format!("Could not start: {e}"));
            return;
        }
    };

    {
        let ctx = ctx.clone();
        app.connect_shutdown(move |_| ctx.shutdown());
    }

    if ctx.session.is_authenticated() {
        crate::ui::main_window::show_main_window(app, ctx);
    } else {
        crate::ui::login::show_login_window(app, ctx);
    }
}
