use adw::Application;
use adw::prelude::*;
use gtk4 as gtk;

use foodrelief::ScreenError;
use foodrelief::api::models::{Donation, DonationStatus};
use foodrelief::router::Route;

pub fn page_box() -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(18);
    root.set_margin_bottom(18);
    root.set_margin_start(18);
    root.set_margin_end(18);
    root
}

pub fn heading(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("title-2");
    label.set_halign(gtk::Align::Start);
    label
}

pub fn muted(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("dim-label");
    label.set_halign(gtk::Align::Start);
    label.set_wrap(true);
    label
}

/// Inline error banner, hidden while there is nothing to show.
pub fn banner() -> gtk::Label {
    let label = gtk::Label::new(None);
    label.add_css_class("error");
    label.set_halign(gtk::Align::Start);
    label.set_wrap(true);
    label.set_visible(false);
    label
}

pub fn set_banner(banner: &gtk::Label, error: Option<&ScreenError>) {
    match error {
        Some(e) => {
            banner.set_label(&e.message);
            banner.set_visible(true);
        }
        None => banner.set_visible(false),
    }
}

pub fn labelled(label: &str, child: &impl IsA<gtk::Widget>) -> gtk::Box {
    let row = gtk::Box::new(gtk::Orientation::Vertical, 4);
    let caption = gtk::Label::new(Some(label));
    caption.add_css_class("heading");
    caption.set_halign(gtk::Align::Start);
    row.append(&caption);
    row.append(child);
    row
}

pub fn entry(placeholder: &str) -> gtk::Entry {
    let entry = gtk::Entry::new();
    entry.set_placeholder_text(Some(placeholder));
    entry.set_hexpand(true);
    entry
}

pub fn clear_children(container: &gtk::Box) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
}

pub fn clear_list(list: &gtk::ListBox) {
    while let Some(child) = list.first_child() {
        list.remove(&child);
    }
}

pub fn status_label(status: DonationStatus) -> &'static str {
    match status {
        DonationStatus::Available => "Available",
        DonationStatus::Assigned => "Assigned",
        DonationStatus::Completed => "Completed",
        DonationStatus::Unknown => "Unknown",
    }
}

/// One donation as a list row. The row's name is the detail page path.
pub fn donation_row(donation: &Donation) -> gtk::ListBoxRow {
    let row = gtk::ListBoxRow::new();
    let body = gtk::Box::new(gtk::Orientation::Vertical, 2);
    body.set_margin_top(8);
    body.set_margin_bottom(8);
    body.set_margin_start(8);
    body.set_margin_end(8);

    let title = gtk::Label::new(Some(&format!(
        "{} · {}",
        donation.food_type.label(),
        donation.quantity
    )));
    title.add_css_class("heading");
    title.set_halign(gtk::Align::Start);
    body.append(&title);

    body.append(&muted(&format!(
        "{} · expires {} · {}",
        donation.pickup_address,
        donation.expiry_display(),
        status_label(donation.status)
    )));
    if donation.is_urgent {
        let urgent = gtk::Label::new(Some("Urgent"));
        urgent.add_css_class("error");
        urgent.set_halign(gtk::Align::Start);
        body.append(&urgent);
    }

    row.set_child(Some(&body));
    row.set_widget_name(&Route::DonationDetail(donation.id.clone()).path());
    row
}

pub fn toast(overlay: &adw::ToastOverlay, text: &str) {
    overlay.add_toast(adw::Toast::new(text));
}

/// Shown when the application cannot start at all.
pub fn show_fatal(app: &Application, message: &str) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Food Relief")
        .default_width(420)
        .default_height(160)
        .build();
    let root = page_box();
    root.append(&heading("Food Relief"));
    root.append(&muted(message));
    window.set_content(Some(&root));
    window.present();
}
