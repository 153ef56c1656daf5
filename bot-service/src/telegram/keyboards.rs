use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CREATE_CARD_CALLBACK: &str = "create_card";
pub const RULES_CALLBACK: &str = "rules";

pub fn make_main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "💌 Create a card",
            CREATE_CARD_CALLBACK,
        )],
        vec![InlineKeyboardButton::callback("📋 Rules", RULES_CALLBACK)],
    ])
}
