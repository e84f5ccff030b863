use adw::Application;
use adw::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use foodrelief::realtime::ChannelUpdate;
use foodrelief::router::{self, Route};
use foodrelief::scope::ViewScope;
use foodrelief::utils::RUNTIME;

use crate::app::AppContext;
use crate::ui::widgets;

/// Window chrome plus the page area. One page is shown at a time; each page
/// owns a [`ViewScope`] that is closed when the user navigates away.
pub struct Shell {
    app: Application,
    window: adw::ApplicationWindow,
    ctx: Rc<AppContext>,
    overlay: adw::ToastOverlay,
    content: gtk::Box,
    title: gtk::Label,
    nav: gtk::Box,
    current: RefCell<Option<Rc<ViewScope>>>,
}

/// Cheap handle pages use to navigate without keeping the shell alive.
#[derive(Clone)]
pub struct Navigator(Weak<Shell>);

impl Navigator {
    pub fn go(&self, route: Route) {
        if let Some(shell) = self.0.upgrade() {
            shell.navigate(route);
        }
    }

    /// Donation form with "Mark as Urgent" already checked.
    pub fn donate_urgent(&self) {
        if let Some(shell) = self.0.upgrade() {
            shell.open(Route::Donate, true);
        }
    }

    pub fn toast(&self, text: &str) {
        if let Some(shell) = self.0.upgrade() {
            widgets::toast(&shell.overlay, text);
        }
    }
}

/// Handed to every page builder.
pub struct PageContext {
    pub ctx: Rc<AppContext>,
    pub scope: Rc<ViewScope>,
    pub nav: Navigator,
}

impl Shell {
    fn navigate(self: &Rc<Self>, route: Route) {
        self.open(route, false);
    }

    fn open(self: &Rc<Self>, route: Route, urgent_form: bool) {
        let route = router::guard(route, &self.ctx.session);
        if route == Route::Login {
            self.sign_out_to_login();
            return;
        }
        log::debug!("Navigating to {}", route.path());

        if let Some(previous) = self.current.borrow_mut().take() {
            previous.close();
        }
        let scope = Rc::new(ViewScope::new(RUNTIME.handle().clone()));
        *self.current.borrow_mut() = Some(scope.clone());

        let page = PageContext {
            ctx: self.ctx.clone(),
            scope,
            nav: Navigator(Rc::downgrade(self)),
        };
        let widget: gtk::Widget = match &route {
            Route::Home | Route::Donations => crate::ui::donations::build_all(&page),
            Route::UrgentDonations => crate::ui::donations::build_urgent(&page),
            Route::DonationDetail(id) => crate::ui::donation_detail::build(&page, id),
            Route::Donate => crate::ui::donation_form::build(&page, urgent_form),
            Route::VolunteerSignup => crate::ui::volunteer_signup::build(&page),
            Route::Tasks => crate::ui::task_assignment::build(&page),
            Route::Emergency => crate::ui::emergency::build(&page),
            Route::Map => crate::ui::map::build(&page),
            Route::Login => return,
        };

        self.title.set_label(route.title());
        widgets::clear_children(&self.content);
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .child(&widget)
            .build();
        self.content.append(&scroller);
    }

    fn sign_out_to_login(self: &Rc<Self>) {
        if let Some(previous) = self.current.borrow_mut().take() {
            previous.close();
        }
        crate::ui::login::show_login_window(&self.app, self.ctx.clone());
        self.window.close();
    }

    fn rebuild_nav(self: &Rc<Self>) {
        widgets::clear_children(&self.nav);
        for route in router::navbar(&self.ctx.session) {
            let button = gtk::Button::with_label(route.title());
            button.add_css_class("flat");
            let nav = Navigator(Rc::downgrade(self));
            button.connect_clicked(move |_| nav.go(route.clone()));
            self.nav.append(&button);
        }
    }
}

pub fn show_main_window(app: &Application, ctx: Rc<AppContext>) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Food Relief")
        .default_width(960)
        .default_height(680)
        .build();

    let overlay = adw::ToastOverlay::new();
    let content = gtk::Box::new(gtk::Orientation::Vertical, 0);
    overlay.set_child(Some(&content));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk::Label::new(Some("Food Relief"));
    header.set_title_widget(Some(&title));

    let nav = gtk::Box::new(gtk::Orientation::Horizontal, 4);
    header.pack_start(&nav);

    let logout_btn = gtk::Button::with_label("Logout");
    header.pack_end(&logout_btn);

    let bell = gtk::MenuButton::new();
    bell.set_icon_name("preferences-system-notifications-symbolic");
    bell.set_tooltip_text(Some("Notifications"));
    header.pack_end(&bell);

    let donate_btn = gtk::Button::with_label("Donate");
    donate_btn.add_css_class("suggested-action");
    header.pack_end(&donate_btn);

    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    let shell = Rc::new(Shell {
        app: app.clone(),
        window: window.clone(),
        ctx: ctx.clone(),
        overlay: overlay.clone(),
        content,
        title,
        nav,
        current: RefCell::new(None),
    });
    shell.rebuild_nav();

    {
        let nav = Navigator(Rc::downgrade(&shell));
        donate_btn.connect_clicked(move |_| nav.go(Route::Donate));
    }
    {
        let shell = Rc::downgrade(&shell);
        let ctx = ctx.clone();
        logout_btn.connect_clicked(move |_| {
            if let Err(e) = ctx.session.logout() {
                log::warn!("Removing the saved session failed: {e}");
            }
            if let Some(shell) = shell.upgrade() {
                shell.sign_out_to_login();
            }
        });
    }

    attach_notifications(&ctx, &bell, &overlay);

    shell.navigate(Route::Donations);
    window.present();

    // Keep the shell alive for as long as the window is open.
    window.connect_close_request(move |_| {
        if let Some(scope) = shell.current.borrow_mut().take() {
            scope.close();
        }
        glib::Propagation::Proceed
    });
}

/// Bell badge and popover fed by the push channel.
fn attach_notifications(ctx: &Rc<AppContext>, bell: &gtk::MenuButton, overlay: &adw::ToastOverlay) {
    let list = gtk::Box::new(gtk::Orientation::Vertical, 6);
    list.set_margin_top(8);
    list.set_margin_bottom(8);
    list.set_margin_start(8);
    list.set_margin_end(8);
    let popover = gtk::Popover::new();
    popover.set_child(Some(&list));
    bell.set_popover(Some(&popover));

    let render = {
        let center = ctx.notifications.clone();
        let bell = bell.clone();
        let list = list.clone();
        move || {
            let unread = center.unread();
            bell.set_label(&if unread > 0 { unread.to_string() } else { String::new() });
            let state = if center.connected() { "Live" } else { "Offline" };
            bell.set_tooltip_text(Some(&format!("Notifications ({state})")));

            widgets::clear_children(&list);
            let items = center.items();
            if items.is_empty() {
                list.append(&widgets::muted("No notifications yet."));
            }
            for item in items {
                let row = widgets::muted(&format!(
                    "{}  {}",
                    item.received_at.format("%H:%M"),
                    item.headline
                ));
                if !item.read {
                    row.remove_css_class("dim-label");
                }
                list.append(&row);
            }
        }
    };
    let render: Rc<dyn Fn()> = Rc::new(render);
    render();

    {
        let center = ctx.notifications.clone();
        let render = render.clone();
        popover.connect_closed(move |_| {
            center.mark_all_read();
            render();
        });
    }

    // The center outlives this window; stop listening once the window is gone.
    let mut updates = ctx.notifications.subscribe();
    let overlay = overlay.downgrade();
    glib::MainContext::default().spawn_local(async move {
        loop {
            let update = updates.recv().await;
            let Some(overlay) = overlay.upgrade() else {
                log::debug!("Notification listener for a closed window stopped");
                break;
            };
            match update {
                Ok(ChannelUpdate::Notification(n)) => {
                    widgets::toast(&overlay, &n.headline);
                    render();
                }
                Ok(_) => render(),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => render(),
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
