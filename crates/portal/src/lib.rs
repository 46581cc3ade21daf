//! Clients for the account and testimonials APIs.

pub mod auth;
mod http;
pub mod session_store;
pub mod testimonials;

pub use auth::{
    AuthClient, DEFAULT_AUTH_API, LoginResponse, OAuthIntent, OAuthProvider, Registration, User,
    token_from_redirect,
};
pub use session_store::{AuthSession, SessionStore};
pub use testimonials::{
    DEFAULT_PAGE_LIMIT, DEFAULT_TESTIMONIALS_API, NewTestimonial, Testimonial, TestimonialFeed,
    TestimonialPage, TestimonialsClient,
};
