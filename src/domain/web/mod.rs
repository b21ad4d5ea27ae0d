//! Web acquisition domain

mod acquisition;

pub use acquisition::WebAcquisition;

#[cfg(test)]
pub use acquisition::mock::MockWebAcquisition;
