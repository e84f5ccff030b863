use adw::prelude::*;
use gtk4 as gtk;
use std::rc::Rc;

use foodrelief::api::models::FoodType;
use foodrelief::router::Route;
use foodrelief::screens::DonationListScreen;

use crate::ui::bridge::run_in_scope;
use crate::ui::main_window::PageContext;
use crate::ui::widgets;

/// General list with the type/urgent filters.
pub fn build_all(page: &PageContext) -> gtk::Widget {
    let screen = DonationListScreen::all(page.ctx.api.clone());
    let root = widgets::page_box();
    root.append(&widgets::heading("Food Donations"));

    let filters = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    let mut labels = vec!["All Types"];
    labels.extend(FoodType::ALL.iter().map(|t| t.label()));
    let type_select = gtk::DropDown::from_strings(&labels);
    let urgent_only = gtk::CheckButton::with_label("Urgent Only");
    filters.append(&type_select);
    filters.append(&urgent_only);

    let links = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    links.set_hexpand(true);
    links.set_halign(gtk::Align::End);
    for route in [Route::UrgentDonations, Route::Map, Route::VolunteerSignup] {
        let button = gtk::Button::with_label(route.title());
        button.add_css_class("flat");
        let nav = page.nav.clone();
        button.connect_clicked(move |_| nav.go(route.clone()));
        links.append(&button);
    }
    filters.append(&links);
    root.append(&filters);

    let list = DonationList::new(page, screen.clone());
    root.append(&list.banner);
    root.append(&list.status);
    root.append(&list.list);

    {
        let screen = screen.clone();
        let list = list.clone();
        type_select.connect_selected_notify(move |dd| {
            let food_type = match dd.selected() {
                0 => None,
                n => FoodType::ALL.get(n as usize - 1).copied(),
            };
            screen.set_food_type(food_type);
            list.reload();
        });
    }
    {
        let list = list.clone();
        urgent_only.connect_toggled(move |b| {
            screen.set_urgent_only(b.is_active());
            list.reload();
        });
    }

    list.reload();
    root.upcast()
}

/// The urgent partition, with a shortcut to create an urgent donation.
pub fn build_urgent(page: &PageContext) -> gtk::Widget {
    let screen = DonationListScreen::urgent(page.ctx.api.clone());
    let root = widgets::page_box();

    let top = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    let heading = widgets::heading("Urgent Donations");
    heading.set_hexpand(true);
    top.append(&heading);
    let create = gtk::Button::with_label("Create Urgent Donation");
    create.add_css_class("destructive-action");
    {
        let nav = page.nav.clone();
        create.connect_clicked(move |_| nav.donate_urgent());
    }
    top.append(&create);
    root.append(&top);

    let list = DonationList::new(page, screen);
    root.append(&list.banner);
    root.append(&list.status);
    root.append(&list.list);
    list.reload();
    root.upcast()
}

#[derive(Clone)]
struct DonationList {
    screen: DonationListScreen,
    scope: Rc<foodrelief::scope::ViewScope>,
    banner: gtk::Label,
    status: gtk::Label,
    list: gtk::ListBox,
}

impl DonationList {
    fn new(page: &PageContext, screen: DonationListScreen) -> Self {
        let list = gtk::ListBox::new();
        list.add_css_class("boxed-list");
        {
            let nav = page.nav.clone();
            list.connect_row_activated(move |_, row| {
                if let Some(route) = Route::parse(&row.widget_name()) {
                    nav.go(route);
                }
            });
        }
        Self {
            screen,
            scope: page.scope.clone(),
            banner: widgets::banner(),
            status: widgets::muted("Loading..."),
            list,
        }
    }

    fn reload(&self) {
        let screen = self.screen.clone();
        let this = self.clone();
        run_in_scope(&self.scope, async move { screen.load().await }, move |()| {
            this.render()
        });
    }

    fn render(&self) {
        let remote = self.screen.donations();
        widgets::set_banner(&self.banner, remote.error());

        let status = if remote.is_initial_load() {
            "Loading..."
        } else if self.screen.shows_empty_state() {
            self.screen.empty_message()
        } else {
            ""
        };
        self.status.set_label(status);
        self.status.set_visible(!status.is_empty());

        widgets::clear_list(&self.list);
        for donation in remote.data().into_iter().flatten() {
            self.list.append(&widgets::donation_row(donation));
        }
    }
}
