//! Loopback transfers through the real cross-memory-attach syscalls.
//!
//! The "remote" process is the test process itself: `process_vm_readv` and
//! `process_vm_writev` accept the caller's own pid, which makes the full
//! endpoint path exercisable without spawning a second process, the same
//! way shared-memory rings get tested with both parties in one process.

use smcopy::{CmaEndpoint, Completion, CopyConfig, EndpointParams, Error, IoVec};

fn own_endpoint() -> CmaEndpoint {
    let params = EndpointParams {
        iface_addr: Some(std::process::id()),
        ..Default::default()
    };
    CmaEndpoint::create(&params).unwrap()
}

fn scatter(base: *mut u8, lens: &[usize]) -> Vec<IoVec> {
    let mut out = Vec::new();
    let mut off = 0;
    for &len in lens {
        out.push(IoVec {
            base: unsafe { base.add(off) },
            len,
        });
        off += len;
    }
    out
}

#[test]
fn test_put_scattered_segments() {
    let ep = own_endpoint();
    let src: Vec<u8> = (0u8..26).collect();
    let mut dst = vec![0u8; 26];
    let iov = scatter(src.as_ptr() as *mut u8, &[7, 3, 16]);

    ep.put_zcopy(&iov, dst.as_mut_ptr() as u64, None).unwrap();

    assert_eq!(dst, src);
    assert_eq!(ep.stats().put_ops(), 1);
    assert_eq!(ep.stats().put_bytes(), 26);
}

#[test]
fn test_get_scattered_segments() {
    let ep = own_endpoint();
    let remote: Vec<u8> = (0u8..32).map(|b| b.wrapping_mul(7)).collect();
    let mut local = vec![0u8; 32];
    let iov = scatter(local.as_mut_ptr(), &[1, 15, 16]);

    ep.get_zcopy(&iov, remote.as_ptr() as u64, None).unwrap();

    assert_eq!(local, remote);
    assert_eq!(ep.stats().get_bytes(), 32);
}

#[test]
fn test_put_then_get_round_trip() {
    let ep = own_endpoint();
    let original: Vec<u8> = (0u8..64).collect();
    let mut staging = vec![0u8; 64];
    let mut back = vec![0u8; 64];

    ep.put_zcopy(
        &[IoVec::from_slice(&original)],
        staging.as_mut_ptr() as u64,
        None,
    )
    .unwrap();
    ep.get_zcopy(
        &[IoVec::from_mut_slice(&mut back)],
        staging.as_ptr() as u64,
        None,
    )
    .unwrap();

    assert_eq!(back, original);
}

#[test]
fn test_zero_length_description_succeeds() {
    let ep = own_endpoint();
    let mut dst = [0u8; 1];
    ep.put_zcopy(&[], dst.as_mut_ptr() as u64, None).unwrap();
    assert_eq!(ep.stats().put_bytes(), 0);
}

#[test]
fn test_completion_handle_is_ignored() {
    let ep = own_endpoint();
    let src = [9u8; 8];
    let mut dst = [0u8; 8];
    let mut comp = Completion { count: 3 };

    ep.put_zcopy(
        &[IoVec::from_slice(&src)],
        dst.as_mut_ptr() as u64,
        Some(&mut comp),
    )
    .unwrap();

    assert_eq!(dst, src);
    assert_eq!(comp.count, 3);
}

#[test]
fn test_segment_cap_enforced() {
    let params = EndpointParams {
        iface_addr: Some(std::process::id()),
        config: CopyConfig::new().with_max_iov(16),
        ..Default::default()
    };
    let ep = CmaEndpoint::create(&params).unwrap();

    let buf = [0u8; 17];
    let iov: Vec<IoVec> = buf.chunks(1).map(IoVec::from_slice).collect();
    let mut dst = vec![0u8; 17];

    let err = ep
        .put_zcopy(&iov, dst.as_mut_ptr() as u64, None)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TooManySegments { count: 17, max: 16 }
    ));
    assert_eq!(dst, vec![0u8; 17]);
}

#[test]
fn test_descriptions_wider_than_one_batch() {
    // 24 segments exceed the 16-entry kernel bound; the endpoint issues
    // two consecutive syscalls and the result is still byte-exact.
    let params = EndpointParams {
        iface_addr: Some(std::process::id()),
        config: CopyConfig::new().with_max_iov(32),
        ..Default::default()
    };
    let ep = CmaEndpoint::create(&params).unwrap();

    let src: Vec<u8> = (0u8..48).collect();
    let mut dst = vec![0u8; 48];
    let iov = scatter(src.as_ptr() as *mut u8, &[2; 24]);

    ep.put_zcopy(&iov, dst.as_mut_ptr() as u64, None).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn test_unreachable_pid_reports_io_error() {
    // Pid 1 is never ptrace-attachable from an unprivileged test run, and a
    // wild remote address is invalid regardless.
    let params = EndpointParams {
        iface_addr: Some(1),
        ..Default::default()
    };
    let ep = CmaEndpoint::create(&params).unwrap();

    let src = [1u8; 4];
    let err = ep
        .put_zcopy(&[IoVec::from_slice(&src)], 0x1000, None)
        .unwrap_err();

    match err {
        Error::ProcessVm {
            fn_name, length, ..
        } => {
            assert_eq!(fn_name, "process_vm_writev");
            assert_eq!(length, 4);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(ep.stats().errors(), 1);
}
