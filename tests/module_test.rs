mod common;
use common::*;

#[test]
fn test_module_has_own_listing_and_variables() {
    let mut r = Basic::new();
    r.enter("X=1");
    r.enter("MODULE M");
    assert_eq!(r.runtime.current_module(), "M");
    program(&mut r, &["10 X=2", "20 PRINT \"IN M\"; X", "30 END"]);
    r.enter("RUN");
    assert_eq!(exec(&mut r), "IN M 2 \n");
    assert_eq!(r.runtime.current_module(), "");
    r.enter("PRINT X; M.X");
    assert_eq!(exec(&mut r), " 1  2 \n");
    r.enter("LIST");
    assert_eq!(exec(&mut r), "");
}

#[test]
fn test_goto_into_module_returns_at_end() {
    let mut r = Basic::new();
    r.enter("MODULE M");
    program(&mut r, &["100 PRINT \"M\"", "110 END"]);
    r.enter("END");
    assert_eq!(r.runtime.current_module(), "");
    program(
        &mut r,
        &["10 MODULE M", "20 GOTO 100", "30 PRINT \"BACK\""],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), "M\nBACK\n");
}

#[test]
fn test_gosub_into_module_returns_at_end() {
    let mut r = Basic::new();
    r.enter("MODULE LIB");
    program(&mut r, &["10 PRINT \"LIB\"; A"]);
    r.enter("END");
    program(
        &mut r,
        &["10 LIB.A=5", "20 MODULE LIB: GOSUB 10", "30 PRINT \"MAIN\""],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), "LIB 5 \nMAIN\n");
}

#[test]
fn test_return_from_module_resumes_caller() {
    let mut r = Basic::new();
    r.enter("MODULE LIB");
    program(&mut r, &["10 PRINT \"LIB\"", "20 RETURN", "30 PRINT \"AFTER\""]);
    r.enter("END");
    program(
        &mut r,
        &["10 MODULE LIB: GOSUB 10: PRINT \"MAIN\"", "20 PRINT \"DONE\""],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), "LIB\nMAIN\nDONE\n");
    assert_eq!(r.runtime.current_module(), "");
    r.enter("MODULE LIB: GOSUB 10");
    assert_eq!(exec(&mut r), "LIB\n");
    assert_eq!(r.runtime.current_module(), "");
}

#[test]
fn test_qualified_assignment_creates_module() {
    let mut r = Basic::new();
    r.enter("Q.V$=\"HI\"");
    r.enter("PRINT Q.V$");
    assert_eq!(exec(&mut r), "HI\n");
    r.enter("PRINT NOPE.V");
    assert_eq!(exec(&mut r), "?UNDEF'D MODULE ERROR\n");
}

#[test]
fn test_module_twice_switches_variable_scope() {
    let mut r = Basic::new();
    program(&mut r, &["10 MODULE A: MODULE B: X=5"]);
    r.enter("RUN");
    assert_eq!(r.runtime.current_module(), "");
    r.enter("PRINT B.X; A.X");
    assert_eq!(exec(&mut r), " 5  0 \n");
}

#[test]
fn test_immediate_modules_nest() {
    let mut r = Basic::new();
    r.enter("MODULE A");
    r.enter("MODULE B");
    assert_eq!(r.runtime.current_module(), "B");
    r.enter("END");
    assert_eq!(r.runtime.current_module(), "A");
    r.enter("END");
    assert_eq!(r.runtime.current_module(), "");
}

#[test]
fn test_error_in_module_resets_scopes() {
    let mut r = Basic::new();
    r.enter("MODULE M");
    program(&mut r, &["10 GOTO 99"]);
    r.enter("RUN");
    assert_eq!(exec(&mut r), "?UNDEF'D STATEMENT ERROR IN 10\n10  GOTO 99\n");
    assert_eq!(r.runtime.current_module(), "");
}

#[test]
fn test_def_fn_belongs_to_module() {
    let mut r = Basic::new();
    r.enter("MODULE M: DEF FNS(X)=X*2");
    r.enter("PRINT FNS(4)");
    assert_eq!(exec(&mut r), " 8 \n");
    r.enter("END");
    r.enter("PRINT FNS(4)");
    assert_eq!(exec(&mut r), "?VARIABLE UNDEFINED ERROR\n");
    r.enter("PRINT M.FNS(4)");
    assert_eq!(exec(&mut r), " 8 \n");
}
