#[path = "../../drivers/dwt.rs"]
pub mod dwt;

#[path = "../../drivers/usb/mod.rs"]
pub mod usb;
