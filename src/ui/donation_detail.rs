use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use foodrelief::screens::{DonationDetailScreen, VolunteerOutcome};

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

pub fn build(page: &PageContext, id: &str) -> gtk::Widget {
    let screen = DonationDetailScreen::new(page.ctx.api.clone(), id);
    let root = widgets::page_box();

    let banner = widgets::banner();
    let outcome = gtk::Label::new(None);
    outcome.set_halign(gtk::Align::Start);
    outcome.set_visible(false);
    let details = gtk::Box::new(gtk::Orientation::Vertical, 6);
    details.append(&widgets::muted("Loading..."));

    let volunteer_btn = gtk::Button::with_label("Volunteer for Pickup");
    volunteer_btn.add_css_class("suggested-action");
    volunteer_btn.set_halign(gtk::Align::Start);
    volunteer_btn.set_visible(false);

    root.append(&banner);
    root.append(&outcome);
    root.append(&details);
    root.append(&volunteer_btn);

    let render: Rc<dyn Fn()> = {
        let screen = screen.clone();
        let volunteer_btn = volunteer_btn.clone();
        Rc::new(move || {
            let remote = screen.donation();
            widgets::set_banner(&banner, remote.error());

            if let Some(result) = screen.volunteer_outcome() {
                outcome.set_label(result.message());
                outcome.remove_css_class("success");
                outcome.remove_css_class("error");
                outcome.add_css_class(match result {
                    VolunteerOutcome::Succeeded => "success",
                    VolunteerOutcome::Failed => "error",
                });
                outcome.set_visible(true);
            }

            let Some(donation) = remote.data() else {
                return;
            };
            widgets::clear_children(&details);
            details.append(&widgets::heading(donation.food_type.label()));
            let facts = [
                ("Quantity", donation.quantity.to_string()),
                ("Expiry Date", donation.expiry_display()),
                ("Pickup Address", donation.pickup_address.clone()),
                ("Description", donation.description.clone()),
                ("Status", widgets::status_label(donation.status).to_string()),
                ("Donor", donation.donor_name().to_string()),
            ];
            for (label, value) in facts {
                if value.is_empty() {
                    continue;
                }
                details.append(&widgets::labelled(label, &widgets::muted(&value)));
            }
            if let Some(assignee) = donation.assignee() {
                details.append(&widgets::labelled(
                    "Assigned To",
                    &widgets::muted(assignee.display_name()),
                ));
            }
            for marker in screen.map_markers() {
                details.append(&widgets::labelled(
                    "Location",
                    &widgets::muted(&format!("{:.5}, {:.5}", marker.latitude, marker.longitude)),
                ));
            }
            volunteer_btn.set_visible(screen.can_volunteer());
        })
    };

    {
        let screen = screen.clone();
        let render = render.clone();
        run_in_scope(&page.scope, async move { screen.load().await }, move |()| render());
    }

    {
        let scope = page.scope.clone();
        volunteer_btn.connect_clicked(move |_| {
            let screen = screen.clone();
            let render = render.clone();
            run_in_scope(&scope, async move { screen.volunteer().await }, move |()| render());
        });
    }

    root.upcast()
}
