use super::*;
use crate::mach::ROOT_MODULE;

#[test]
fn test_next_cannot_reach_loop_outside_subroutine() {
    let (mut r, host) = runtime();
    let out = run(
        &mut r,
        &host,
        &["10 FOR I=1 TO 2", "20 GOSUB 100", "30 NEXT I", "100 NEXT I", "RUN"],
    );
    assert_eq!(out, "?NEXT WITHOUT FOR ERROR IN 100\n100 NEXT I\n");
}

#[test]
fn test_stale_gosub_dropped_by_next_line() {
    let (mut r, host) = runtime();
    let out = run(&mut r, &host, &["100 STOP", "110 RETURN", "GOSUB 100"]);
    assert_eq!(out, "?BREAK IN 100\n");
    assert_eq!(r.modules[ROOT_MODULE].gosub_stack.len(), 1);
    let out = run(&mut r, &host, &["RETURN"]);
    assert_eq!(out, "?RETURN WITHOUT GOSUB ERROR\n");
}

#[test]
fn test_scopes_return_to_root_after_module_end() {
    let (mut r, host) = runtime();
    run(&mut r, &host, &["MODULE M", "10 PRINT 1", "END"]);
    let out = run(&mut r, &host, &["10 MODULE M: GOSUB 10", "RUN"]);
    assert_eq!(out, " 1 \n");
    assert_eq!(r.scopes.depth(), 1);
    assert!(r.scopes.in_lockstep());
}
