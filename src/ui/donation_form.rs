use adw::prelude::*;
use gtk4 as gtk;

use foodrelief::api::models::FoodType;
use foodrelief::screens::DonationFormScreen;

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

const SUBMIT_LABEL: &str = "Create Donation";

pub fn build(page: &PageContext, urgent: bool) -> gtk::Widget {
    let screen = if urgent {
        DonationFormScreen::urgent(page.ctx.api.clone())
    } else {
        DonationFormScreen::new(page.ctx.api.clone())
    };

    let root = widgets::page_box();
    root.append(&widgets::heading("Create Donation"));
    let banner = widgets::banner();
    root.append(&banner);

    let mut labels = vec!["Select food type"];
    labels.extend(FoodType::ALL.iter().map(|t| t.label()));
    let food_type = gtk::DropDown::from_strings(&labels);
    {
        let screen = screen.clone();
        food_type.connect_selected_notify(move |dd| {
            let selected = match dd.selected() {
                0 => None,
                n => FoodType::ALL.get(n as usize - 1).copied(),
            };
            screen.set_food_type(selected);
        });
    }
    root.append(&widgets::labelled("Food Type", &food_type));

    let quantity = widgets::entry("Quantity");
    quantity.set_input_purpose(gtk::InputPurpose::Number);
    {
        let screen = screen.clone();
        quantity.connect_changed(move |e| screen.set_quantity(&e.text()));
    }
    root.append(&widgets::labelled("Quantity", &quantity));

    let expiry = widgets::entry("YYYY-MM-DD");
    {
        let screen = screen.clone();
        expiry.connect_changed(move |e| screen.set_expiry_date(&e.text()));
    }
    root.append(&widgets::labelled("Expiry Date", &expiry));

    let address = widgets::entry("Pickup address");
    {
        let screen = screen.clone();
        address.connect_changed(move |e| screen.set_pickup_address(&e.text()));
    }
    root.append(&widgets::labelled("Pickup Address", &address));

    let description = gtk::TextView::new();
    description.set_wrap_mode(gtk::WrapMode::WordChar);
    description.set_height_request(80);
    {
        let screen = screen.clone();
        description.buffer().connect_changed(move |buffer| {
            let (start, end) = buffer.bounds();
            screen.set_description(&buffer.text(&start, &end, false));
        });
    }
    root.append(&widgets::labelled("Description", &description));

    let urgent_check = gtk::CheckButton::with_label("Mark as Urgent");
    urgent_check.set_active(screen.draft().is_urgent);
    {
        let screen = screen.clone();
        urgent_check.connect_toggled(move |b| screen.set_urgent(b.is_active()));
    }
    root.append(&urgent_check);

    let submit = gtk::Button::with_label(SUBMIT_LABEL);
    submit.add_css_class("suggested-action");
    submit.set_halign(gtk::Align::End);
    root.append(&submit);

    let scope = page.scope.clone();
    let nav = page.nav.clone();
    submit.connect_clicked(move |button| {
        if screen.is_submitting() {
            return;
        }
        button.set_sensitive(false);
        button.set_label("Creating...");

        let task = screen.clone();
        let screen = screen.clone();
        let button = button.clone();
        let banner = banner.clone();
        let nav = nav.clone();
        run_in_scope(&scope, async move { task.submit().await }, move |next| {
            button.set_sensitive(true);
            button.set_label(SUBMIT_LABEL);
            widgets::set_banner(&banner, screen.error().as_ref());
            if let Some(route) = next {
                nav.toast("Donation created");
                nav.go(route);
            }
        });
    });

    root.upcast()
}
