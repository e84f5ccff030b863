use adw::Application;
use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use crate::app::AppContext;

pub fn show_login_window(app: &Application, ctx: Rc<AppContext>) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Food Relief Login")
        .default_width(420)
        .default_height(260)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Sign in to Food Relief"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    // The identity provider issues the token; this window only stores it.
    let hint = match ctx.config.oauth_client_id.as_deref() {
        Some(client_id) => format!("Sign in with Google (client {client_id}) and paste the access token."),
        None => "Paste the access token issued by your relief organisation.".to_string(),
    };
    let hint = gtk::Label::new(Some(&hint));
    hint.add_css_class("dim-label");
    hint.set_wrap(true);
    hint.set_halign(gtk::Align::Start);
    root.append(&hint);

    let token_entry = gtk::PasswordEntry::new();
    token_entry.set_placeholder_text(Some("Access token"));
    token_entry.set_show_peek_icon(true);
    token_entry.set_hexpand(true);
    root.append(&token_entry);

    let login_btn = gtk::Button::with_label("Sign in");
    login_btn.add_css_class("suggested-action");
    login_btn.set_halign(gtk::Align::End);
    root.append(&login_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let header_title = gtk::Label::new(Some("Food Relief"));
    header.set_title_widget(Some(&header_title));
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    let on_login = {
        let app = app.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let token_entry = token_entry.clone();
        move || {
            let token = token_entry.text().trim().to_string();
            if token.is_empty() {
                overlay.add_toast(adw::Toast::new("Please enter an access token."));
                return;
            }
            if let Err(e) = ctx.session.login(&token) {
                log::error!("Saving the session failed: {e}");
                overlay.add_toast(adw::Toast::new(&format!("Failed to save session: {e}")));
                return;
            }
            crate::ui::main_window::show_main_window(&app, ctx.clone());
            window.close();
        }
    };

    let on_login: Rc<dyn Fn()> = Rc::new(on_login);
    {
        let on_login = on_login.clone();
        login_btn.connect_clicked(move |_| (on_login)());
    }
    {
        let on_login = on_login.clone();
        token_entry.connect_activate(move |_| (on_login)());
    }

    window.present();
}
