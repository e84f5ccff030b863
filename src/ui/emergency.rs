use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use foodrelief::screens::EmergencyScreen;

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

pub fn build(page: &PageContext) -> gtk::Widget {
    let screen = EmergencyScreen::new(page.ctx.api.clone(), page.ctx.config.emergency_deactivation);
    let root = widgets::page_box();
    root.append(&widgets::heading("Emergency Mode"));

    let banner = widgets::banner();
    let state_label = widgets::muted("Loading...");
    let toggle = gtk::Button::with_label("Activate Emergency");
    toggle.set_halign(gtk::Align::Start);
    toggle.set_sensitive(false);
    root.append(&banner);
    root.append(&state_label);
    root.append(&toggle);

    let editor = gtk::Box::new(gtk::Orientation::Vertical, 12);
    editor.set_visible(false);
    root.append(&editor);

    let location = widgets::entry("Affected area");
    editor.append(&widgets::labelled("Location", &location));
    let description = gtk::TextView::new();
    description.set_wrap_mode(gtk::WrapMode::WordChar);
    description.set_height_request(80);
    editor.append(&widgets::labelled("Description", &description));

    let items = gtk::Box::new(gtk::Orientation::Vertical, 6);
    editor.append(&widgets::labelled("Required Items", &items));
    let add_item = gtk::Button::with_label("Add Item");
    add_item.set_halign(gtk::Align::Start);
    editor.append(&add_item);
    let update = gtk::Button::with_label("Update Emergency Details");
    update.add_css_class("suggested-action");
    update.set_halign(gtk::Align::End);
    editor.append(&update);

    // Rebuilt on add/remove only; typing edits the held status in place.
    let refresh_items: Rc<dyn Fn()> = Rc::new({
        let screen = screen.clone();
        let items = items.clone();
        move || render_items(&screen, &items)
    });
    {
        let screen = screen.clone();
        let refresh_items = refresh_items.clone();
        add_item.connect_clicked(move |_| {
            screen.add_item();
            refresh_items();
        });
    }

    let render: Rc<dyn Fn()> = Rc::new({
        let screen = screen.clone();
        let banner = banner.clone();
        let toggle = toggle.clone();
        let editor = editor.clone();
        let location = location.clone();
        let description = description.clone();
        move || {
            widgets::set_banner(&banner, screen.error().as_ref());
            let remote = screen.status();
            if remote.is_initial_load() {
                return;
            }
            let held = screen.held();
            state_label.set_label(if held.active {
                "Emergency mode is active."
            } else {
                "Emergency mode is not active."
            });

            toggle.set_sensitive(screen.can_toggle());
            toggle.remove_css_class("destructive-action");
            toggle.remove_css_class("suggested-action");
            if held.active {
                toggle.set_label("Deactivate Emergency");
                toggle.add_css_class("destructive-action");
            } else {
                toggle.set_label("Activate Emergency");
                toggle.add_css_class("suggested-action");
            }

            editor.set_visible(held.active);
            location.set_text(&held.location);
            description.buffer().set_text(&held.description);
            refresh_items();
        }
    });

    // Rendering writes the same text back, so these stay connected throughout.
    {
        let screen = screen.clone();
        location.connect_changed(move |e| screen.set_location(&e.text()));
    }
    {
        let screen = screen.clone();
        description.buffer().connect_changed(move |buffer| {
            let (start, end) = buffer.bounds();
            screen.set_description(&buffer.text(&start, &end, false));
        });
    }

    {
        let screen = screen.clone();
        let render = render.clone();
        run_in_scope(&page.scope, async move { screen.load().await }, move |()| render());
    }
    {
        let screen = screen.clone();
        let render = render.clone();
        let scope = page.scope.clone();
        toggle.connect_clicked(move |button| {
            button.set_sensitive(false);
            let task = screen.clone();
            let render = render.clone();
            run_in_scope(&scope, async move { task.toggle().await }, move |()| render());
        });
    }
    {
        let scope = page.scope.clone();
        let nav = page.nav.clone();
        update.connect_clicked(move |button| {
            button.set_sensitive(false);
            let task = screen.clone();
            let screen = screen.clone();
            let render = render.clone();
            let button = button.clone();
            let nav = nav.clone();
            run_in_scope(&scope, async move { task.update().await }, move |()| {
                button.set_sensitive(true);
                if screen.error().is_none() {
                    nav.toast("Emergency details updated");
                }
                render();
            });
        });
    }

    root.upcast()
}

fn render_items(screen: &EmergencyScreen, items: &gtk::Box) {
    widgets::clear_children(items);
    for (index, item) in screen.held().required_items.iter().enumerate() {
        let row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = widgets::entry("Item");
        entry.set_text(item);
        {
            let screen = screen.clone();
            entry.connect_changed(move |e| screen.edit_item(index, &e.text()));
        }
        let remove = gtk::Button::from_icon_name("list-remove-symbolic");
        remove.set_tooltip_text(Some("Remove"));
        {
            let screen = screen.clone();
            let items = items.clone();
            remove.connect_clicked(move |_| {
                screen.remove_item(index);
                render_items(&screen, &items);
            });
        }
        row.append(&entry);
        row.append(&remove);
        items.append(&row);
    }
}
