use adw::prelude::*;
use gtk4 as gtk;

use foodrelief::api::models::{TimeSlot, VehicleType};
use foodrelief::screens::VolunteerSignupScreen;

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

const SUBMIT_LABEL: &str = "Sign Up";

pub fn build(page: &PageContext) -> gtk::Widget {
    let screen = VolunteerSignupScreen::new(page.ctx.api.clone());
    let root = widgets::page_box();
    root.append(&widgets::heading("Volunteer Signup"));
    let banner = widgets::banner();
    root.append(&banner);

    let slots = gtk::FlowBox::new();
    slots.set_selection_mode(gtk::SelectionMode::None);
    slots.set_max_children_per_line(4);
    for slot in TimeSlot::ALL {
        let check = gtk::CheckButton::with_label(slot.label());
        let screen = screen.clone();
        check.connect_toggled(move |b| screen.toggle_slot(slot, b.is_active()));
        slots.insert(&check, -1);
    }
    root.append(&widgets::labelled("Availability", &slots));

    let mut labels = vec!["Select vehicle type"];
    labels.extend(VehicleType::ALL.iter().map(|v| v.label()));
    let vehicle = gtk::DropDown::from_strings(&labels);
    {
        let screen = screen.clone();
        vehicle.connect_selected_notify(move |dd| {
            let selected = match dd.selected() {
                0 => None,
                n => VehicleType::ALL.get(n as usize - 1).copied(),
            };
            screen.set_vehicle(selected);
        });
    }
    root.append(&widgets::labelled("Vehicle Type", &vehicle));

    let area = widgets::entry("Neighbourhood or district");
    {
        let screen = screen.clone();
        area.connect_changed(move |e| screen.set_area(&e.text()));
    }
    root.append(&widgets::labelled("Preferred Area", &area));

    let experience = gtk::TextView::new();
    experience.set_wrap_mode(gtk::WrapMode::WordChar);
    experience.set_height_request(80);
    {
        let screen = screen.clone();
        experience.buffer().connect_changed(move |buffer| {
            let (start, end) = buffer.bounds();
            screen.set_experience(&buffer.text(&start, &end, false));
        });
    }
    root.append(&widgets::labelled("Experience", &experience));

    let phone = widgets::entry("Phone number");
    phone.set_input_purpose(gtk::InputPurpose::Phone);
    {
        let screen = screen.clone();
        phone.connect_changed(move |e| screen.set_phone_number(&e.text()));
    }
    root.append(&widgets::labelled("Phone Number", &phone));

    let contact = widgets::entry("Name and phone");
    {
        let screen = screen.clone();
        contact.connect_changed(move |e| screen.set_emergency_contact(&e.text()));
    }
    root.append(&widgets::labelled("Emergency Contact", &contact));

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
        button.set_label("Submitting...");

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
                nav.toast("Thanks for signing up");
                nav.go(route);
            }
        });
    });

    root.upcast()
}
