pub mod usermodel;
pub mod locationmodel;
pub mod propertymodel;
pub mod bookingmodel;
