pub mod arbitrary;
pub mod executable;
pub mod homograph;
pub mod phishing;
