use adw::prelude::*;
use gtk4 as gtk;
use std::cell::RefCell;
use std::rc::Rc;

use foodrelief::screens::TaskAssignmentScreen;

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

const SUBMIT_LABEL: &str = "Assign Task";

/// Ids behind the dropdown rows; index 0 is the placeholder.
#[derive(Default)]
struct Choices {
    donations: Vec<String>,
    volunteers: Vec<String>,
}

pub fn build(page: &PageContext) -> gtk::Widget {
    let screen = TaskAssignmentScreen::new(page.ctx.api.clone());
    let choices = Rc::new(RefCell::new(Choices::default()));

    let root = widgets::page_box();
    root.append(&widgets::heading("Task Assignment"));
    let banner = widgets::banner();
    let status = widgets::muted("Loading...");
    root.append(&banner);
    root.append(&status);

    let donation_select = gtk::DropDown::from_strings(&["Select donation"]);
    root.append(&widgets::labelled("Donation", &donation_select));
    let volunteer_select = gtk::DropDown::from_strings(&["Select volunteer"]);
    root.append(&widgets::labelled("Volunteer", &volunteer_select));

    let note = widgets::entry("Optional note for the volunteer");
    {
        let screen = screen.clone();
        note.connect_changed(move |e| screen.set_note(&e.text()));
    }
    root.append(&widgets::labelled("Notes", &note));

    let submit = gtk::Button::with_label(SUBMIT_LABEL);
    submit.add_css_class("suggested-action");
    submit.set_halign(gtk::Align::End);
    root.append(&submit);

    root.append(&widgets::heading("Current Assignments"));
    let assignments = gtk::Box::new(gtk::Orientation::Vertical, 6);
    root.append(&assignments);

    {
        let screen = screen.clone();
        let choices = choices.clone();
        donation_select.connect_selected_notify(move |dd| {
            let id = choice(&choices.borrow().donations, dd.selected());
            screen.select_donation(&id);
        });
    }
    {
        let screen = screen.clone();
        let choices = choices.clone();
        volunteer_select.connect_selected_notify(move |dd| {
            let id = choice(&choices.borrow().volunteers, dd.selected());
            screen.select_volunteer(&id);
        });
    }

    let render: Rc<dyn Fn()> = Rc::new({
        let screen = screen.clone();
        let banner = banner.clone();
        let donation_select = donation_select.clone();
        let volunteer_select = volunteer_select.clone();
        let note = note.clone();
        move || {
            widgets::set_banner(&banner, screen.error().as_ref());
            let remote = screen.board();
            status.set_visible(remote.is_initial_load());
            let Some(board) = remote.data() else {
                return;
            };

            // Repopulating resets both dropdowns to the placeholder, which
            // matches the cleared selection after a successful assignment.
            {
                let mut ids = choices.borrow_mut();
                ids.donations = board.donations.iter().map(|d| d.id.clone()).collect();
                ids.volunteers = board.volunteers.iter().map(|v| v.id.clone()).collect();
            }
            let mut labels = vec!["Select donation".to_string()];
            labels.extend(board.donations.iter().map(|d| d.summary()));
            donation_select.set_model(Some(&string_list(&labels)));
            let mut labels = vec!["Select volunteer".to_string()];
            labels.extend(board.volunteers.iter().map(|v| v.summary()));
            volunteer_select.set_model(Some(&string_list(&labels)));

            let (_, _, current_note) = screen.selection();
            if note.text() != current_note {
                note.set_text(&current_note);
            }

            widgets::clear_children(&assignments);
            let current = screen.current_assignments();
            if current.is_empty() {
                assignments.append(&widgets::muted("No tasks assigned yet."));
            }
            for donation in current {
                let assignee = donation
                    .assignee()
                    .map(|a| a.display_name().to_string())
                    .unwrap_or_default();
                assignments.append(&widgets::muted(&format!(
                    "{} · {} → {}",
                    donation.food_type.label(),
                    donation.pickup_address,
                    assignee
                )));
            }
        }
    });

    {
        let screen = screen.clone();
        let render = render.clone();
        run_in_scope(&page.scope, async move { screen.load().await }, move |()| render());
    }

    let scope = page.scope.clone();
    let nav = page.nav.clone();
    submit.connect_clicked(move |button| {
        if screen.is_submitting() {
            return;
        }
        button.set_sensitive(false);
        button.set_label("Assigning...");

        let task = screen.clone();
        let screen = screen.clone();
        let button = button.clone();
        let banner = banner.clone();
        let render = render.clone();
        let nav = nav.clone();
        run_in_scope(&scope, async move { task.submit().await }, move |assigned| {
            button.set_sensitive(true);
            button.set_label(SUBMIT_LABEL);
            if assigned {
                nav.toast("Task assigned");
                render();
            } else {
                // keep the user's picks in the dropdowns
                widgets::set_banner(&banner, screen.error().as_ref());
            }
        });
    });

    root.upcast()
}

fn choice(ids: &[String], selected: u32) -> String {
    match selected {
        0 | gtk::INVALID_LIST_POSITION => String::new(),
        n => ids.get(n as usize - 1).cloned().unwrap_or_default(),
    }
}

fn string_list(labels: &[String]) -> gtk::StringList {
    let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    gtk::StringList::new(&refs)
}
