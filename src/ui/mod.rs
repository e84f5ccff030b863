pub mod bridge;
pub mod donation_detail;
pub mod donation_form;
pub mod donations;
pub mod emergency;
pub mod login;
pub mod main_window;
pub mod map;
pub mod task_assignment;
pub mod volunteer_signup;
pub mod widgets;
