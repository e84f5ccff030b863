use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use foodrelief::router::Route;
use foodrelief::screens::MapScreen;

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

/// Donation locations as a marker list, with a link out to a rendered map
/// when a maps key is configured.
pub fn build(page: &PageContext) -> gtk::Widget {
    let screen = MapScreen::new(page.ctx.api.clone(), page.ctx.config.maps_api_key.clone());
    let root = widgets::page_box();
    root.append(&widgets::heading("Donation Map"));
    let banner = widgets::banner();
    let status = widgets::muted("Loading...");
    root.append(&banner);
    root.append(&status);

    let position = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let latitude = widgets::entry("Latitude");
    let longitude = widgets::entry("Longitude");
    let set_position = gtk::Button::with_label("Center Here");
    position.append(&latitude);
    position.append(&longitude);
    position.append(&set_position);
    root.append(&widgets::labelled("Your Location", &position));

    let map_link = gtk::LinkButton::with_label("", "Open Map");
    map_link.set_halign(gtk::Align::Start);
    map_link.set_visible(false);
    root.append(&map_link);

    let markers = gtk::ListBox::new();
    markers.add_css_class("boxed-list");
    root.append(&markers);

    let selected = gtk::Box::new(gtk::Orientation::Vertical, 6);
    root.append(&selected);

    let render: Rc<dyn Fn()> = Rc::new({
        let screen = screen.clone();
        let markers = markers.clone();
        let nav = page.nav.clone();
        move || {
            let remote = screen.donations();
            widgets::set_banner(&banner, remote.error());
            status.set_visible(remote.is_initial_load());

            match screen.static_map_url() {
                Some(url) => {
                    map_link.set_uri(url.as_str());
                    map_link.set_visible(true);
                }
                None => map_link.set_visible(false),
            }

            widgets::clear_list(&markers);
            let (lat, lng) = screen.center();
            markers.append(&marker_row(
                "",
                &format!("Map center {lat:.4}, {lng:.4} · zoom {}", screen.zoom()),
            ));
            for marker in screen.markers() {
                let urgency = if marker.urgent { " · Urgent" } else { "" };
                markers.append(&marker_row(
                    &marker.donation_id,
                    &format!(
                        "{} at {:.4}, {:.4}{}",
                        marker.label, marker.latitude, marker.longitude, urgency
                    ),
                ));
            }

            widgets::clear_children(&selected);
            if let Some(donation) = screen.selected() {
                selected.append(&widgets::heading(donation.food_type.label()));
                selected.append(&widgets::muted(&donation.summary()));
                let open = gtk::Button::with_label("View Details");
                open.set_halign(gtk::Align::Start);
                let nav = nav.clone();
                open.connect_clicked(move |_| nav.go(Route::DonationDetail(donation.id.clone())));
                selected.append(&open);
            }
        }
    });

    {
        let screen = screen.clone();
        let render = render.clone();
        markers.connect_row_activated(move |_, row| {
            let id = row.widget_name();
            screen.select(Some(id.as_str()).filter(|id| !id.is_empty()));
            render();
        });
    }
    {
        let screen = screen.clone();
        let render = render.clone();
        let nav = page.nav.clone();
        set_position.connect_clicked(move |_| {
            let parsed = (
                latitude.text().trim().parse::<f64>(),
                longitude.text().trim().parse::<f64>(),
            );
            match parsed {
                (Ok(lat), Ok(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
                    screen.set_user_location(lat, lng);
                    render();
                }
                _ => nav.toast("Enter a valid latitude and longitude"),
            }
        });
    }

    run_in_scope(&page.scope, async move { screen.load().await }, move |()| render());
    root.upcast()
}

fn marker_row(id: &str, text: &str) -> gtk::ListBoxRow {
    let row = gtk::ListBoxRow::new();
    let label = gtk::Label::new(Some(text));
    label.set_halign(gtk::Align::Start);
    label.set_margin_top(6);
    label.set_margin_bottom(6);
    label.set_margin_start(8);
    row.set_child(Some(&label));
    row.set_widget_name(id);
    row
}
