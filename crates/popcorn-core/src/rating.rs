use thiserror::Error;

pub const DEFAULT_STARS: u8 = 10;

/// Reported to the owner of the widget on every accepted selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChange {
    pub rating: u8,
    pub interaction_count: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating {rating} is outside 1-{max}")]
    OutOfRange { rating: u8, max: u8 },
}

/// Star rating input: hover preview, selection and a selection counter
#[derive(Debug, Clone)]
pub struct StarRating {
    max_stars: u8,
    rating: u8,
    hover: Option<u8>,
    interaction_count: u32,
}

impl Default for StarRating {
    fn default() -> Self {
        Self::new(DEFAULT_STARS)
    }
}

impl StarRating {
    pub fn new(max_stars: u8) -> Self {
        Self {
            max_stars: max_stars.max(1),
            rating: 0,
            hover: None,
            interaction_count: 0,
        }
    }

    pub fn max_stars(&self) -> u8 {
        self.max_stars
    }

    /// Selected rating, 0 until the user picks one
    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn interaction_count(&self) -> u32 {
        self.interaction_count
    }

    pub fn hover(&mut self, star: u8) {
        if (1..=self.max_stars).contains(&star) {
            self.hover = Some(star);
        }
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    pub fn select(&mut self, star: u8) -> Result<RatingChange, RatingError> {
        if !(1..=self.max_stars).contains(&star) {
            return Err(RatingError::OutOfRange {
                rating: star,
                max: self.max_stars,
            });
        }
        self.rating = star;
        self.interaction_count += 1;
        Ok(RatingChange {
            rating: star,
            interaction_count: self.interaction_count,
        })
    }

    /// Value to draw: the hovered star wins over the selection
    pub fn displayed(&self) -> u8 {
        self.hover.unwrap_or(self.rating)
    }

    pub fn is_filled(&self, star: u8) -> bool {
        star >= 1 && star <= self.displayed()
    }

    /// Render as a row of filled and empty stars
    pub fn render(&self) -> String {
        (1..=self.max_stars)
            .map(|star| if self.is_filled(star) { '★' } else { '☆' })
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.max_stars);
    }
}
