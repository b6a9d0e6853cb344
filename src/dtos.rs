pub mod userdtos;
pub mod propertydtos;
pub mod locationdtos;
pub mod bookingdtos;
pub mod pagination;
