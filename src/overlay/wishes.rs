use rand::RngExt;

use crate::config::PartyConfig;

/// Built-in messages shown when the envelope is opened.
pub const WISHES: [&str; 5] = [
    "Wishing you a day filled with happiness and a year filled with joy. Happy birthday! 🎉",
    "May your birthday be as special as you are! Enjoy your day to the fullest! 🎂",
    "Another year older, another year wiser! Hope your birthday is amazing! ✨",
    "Sending you smiles for every moment of your special day! Have a wonderful birthday! 🌟",
    "May all your dreams and wishes come true today and always! Happy birthday! 🎈",
];

/// The configured envelope message, or a random built-in wish.
pub fn pick_wish(config: &PartyConfig, rng: &mut impl RngExt) -> String {
    match &config.envelope_message {
        Some(message) if !message.trim().is_empty() => message.clone(),
        _ => WISHES[rng.random_range(0..WISHES.len())].to_string(),
    }
}

/// The modal message shown in front of the camera.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishOverlay {
    text: Option<String>,
}

impl WishOverlay {
    pub fn open(&mut self, text: String) {
        log::info!("Wish opened");
        self.text = Some(text);
    }

    /// Closes the overlay. Returns whether it was open.
    pub fn dismiss(&mut self) -> bool {
        self.text.take().is_some()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.text.is_some()
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
