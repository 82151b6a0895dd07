mod lists;
mod profiles;

pub use lists::{get_list, list_names};
pub use profiles::{batch, followers, health, login, logout, user_info};
