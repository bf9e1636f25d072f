//! A manually pumped image loader.
//!
//! Requests only complete when the test says so, which makes load ordering
//! (and the races the engine's sequence tokens resolve) fully scriptable.

use tr_core::error::ImageError;
use tr_core::surface::{ImageHandle, ImageLoader, ImageTicket};

#[derive(Debug, Default)]
pub struct ManualLoader {
    next_ticket: u64,
    next_image: u64,
    /// Every request made, in order, with its ticket.
    pub requests: Vec<(ImageTicket, String)>,
    ready: Vec<(ImageTicket, Result<ImageHandle, ImageError>)>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The URL a ticket was issued for.
    pub fn url_of(&self, ticket: ImageTicket) -> Option<&str> {
        self.requests
            .iter()
            .find(|(t, _)| *t == ticket)
            .map(|(_, url)| url.as_str())
    }

    /// The most recent ticket whose URL contains `fragment`.
    pub fn ticket_for(&self, fragment: &str) -> Option<ImageTicket> {
        self.requests
            .iter()
            .rev()
            .find(|(_, url)| url.contains(fragment))
            .map(|(ticket, _)| *ticket)
    }

    /// Complete a request with a decoded image of the given natural size.
    pub fn complete(&mut self, ticket: ImageTicket, width: f64, height: f64) -> ImageHandle {
        self.next_image += 1;
        let image = ImageHandle {
            id: self.next_image,
            width,
            height,
        };
        self.ready.push((ticket, Ok(image)));
        image
    }

    /// Fail a request.
    pub fn fail(&mut self, ticket: ImageTicket) {
        let url = self.url_of(ticket).unwrap_or("<unknown>").to_string();
        self.ready.push((ticket, Err(ImageError { url })));
    }
}

impl ImageLoader for ManualLoader {
    fn request(&mut self, url: &str) -> ImageTicket {
        self.next_ticket += 1;
        let ticket = ImageTicket(self.next_ticket);
        self.requests.push((ticket, url.to_string()));
        ticket
    }

    fn take_ready(&mut self) -> Vec<(ImageTicket, Result<ImageHandle, ImageError>)> {
        std::mem::take(&mut self.ready)
    }
}
