mod common;

use common::{mounted_session, TestSession};
use usbms::{api, ErrorKind, OpenModeFlags};

const WRITE_CREATE: u8 = 0x04 | 0x40;

#[test]
fn absent_handle_is_a_param_error() {
    let none = || None::<&mut TestSession>;
    let mut len = 0usize;
    let mut buf = [0u8; 4];

    let results = [
        api::init(none()),
        api::deinit(none()),
        api::open(none(), "a.txt", WRITE_CREATE),
        api::close(none()),
        api::write(none(), b"abc", &mut len, false),
        api::wait_until_started(none(), 10),
        api::read(none(), &mut buf, &mut len),
        api::mount(none()),
        api::seek_to_end(none()),
    ];
    for result in results {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::ParamError);
    }
}

#[test]
fn raw_flag_bits_match_open_mode_flags() {
    assert_eq!(OpenModeFlags::READ.bits(), 0x02);
    assert_eq!(OpenModeFlags::WRITE.bits(), 0x04);
    assert_eq!(OpenModeFlags::OPEN_IF_EXISTS.bits(), 0x08);
    assert_eq!(OpenModeFlags::CREATE_NEW.bits(), 0x10);
    assert_eq!(OpenModeFlags::OVERWRITE.bits(), 0x20);
    assert_eq!(OpenModeFlags::CREATE_OR_OPEN.bits(), 0x40);
    assert_eq!(OpenModeFlags::APPEND.bits(), 0x80);
}

#[test]
fn undefined_flag_bits_are_rejected() {
    let mut s = mounted_session();
    let err = api::open(Some(&mut s), "a.txt", 0x01).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParamError);
    assert!(!s.is_open());
}

#[test]
fn lengths_are_in_out() {
    let mut s = mounted_session();
    api::open(Some(&mut s), "a.txt", WRITE_CREATE | 0x02).unwrap();

    let mut len = 3;
    api::write(Some(&mut s), b"abcdef", &mut len, false).unwrap();
    assert_eq!(len, 3);

    let mut len = 10;
    let err = api::write(Some(&mut s), b"abc", &mut len, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParamError);

    api::close(Some(&mut s)).unwrap();
    api::open(Some(&mut s), "a.txt", 0x02).unwrap();
    let mut buf = [0u8; 8];
    let mut len = buf.len();
    api::read(Some(&mut s), &mut buf, &mut len).unwrap();
    assert_eq!(&buf[..len], b"abc");
}

#[test]
fn open_write_close_through_facade() {
    let mut s = mounted_session();
    let mut len = 4;
    api::open_write_close(Some(&mut s), "f.txt", b"datadata", &mut len, WRITE_CREATE, false).unwrap();
    assert_eq!(len, 4);
    assert!(!s.is_open());

    let mut len = 2;
    api::open_write_close(Some(&mut s), "f.txt", b"++", &mut len, WRITE_CREATE, true).unwrap();
    assert!(s.is_open());
    api::deinit(Some(&mut s)).unwrap();
    assert_eq!(s.filesystem().contents("f.txt").unwrap(), b"data++");
}

#[test]
fn close_on_closed_handle() {
    let mut s = mounted_session();
    let err = api::close(Some(&mut s)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InterfaceClosed);
}
