mod common;
use basic::mach::Status;
use common::*;

#[test]
fn test_for_loop_counts_and_leaves_var_past_end() {
    let mut r = Basic::new();
    program(&mut r, &["10 FOR I=1 TO 3 STEP 1", "20 PRINT I", "30 NEXT I"]);
    r.enter("RUN");
    assert_eq!(exec(&mut r), " 1 \n 2 \n 3 \n");
    r.enter("PRINT I");
    assert_eq!(exec(&mut r), " 4 \n");
}

#[test]
fn test_for_loop_always_runs_once() {
    let mut r = Basic::new();
    r.enter("FOR I=3 TO 0:PRINT I:NEXT I");
    assert_eq!(exec(&mut r), " 3 \n");
}

#[test]
fn test_for_loop_negative_step() {
    let mut r = Basic::new();
    r.enter("FOR I=3 TO 1 STEP -1:PRINT I;:NEXT");
    assert_eq!(exec(&mut r), " 3  2  1 ");
}

#[test]
fn test_for_loop_resumes_mid_line() {
    let mut r = Basic::new();
    r.enter("FOR I=1 TO 2:FOR J=1 TO 2:PRINT I*10+J;:NEXT J,I");
    assert_eq!(exec(&mut r), " 11  12  21  22 ");
}

#[test]
fn test_breaking_out_of_for_loop_with_goto() {
    let mut r = Basic::new();
    program(
        &mut r,
        &[
            "10 FOR Y=1 TO 2",
            "20 FOR X=8 TO 9",
            "30 PRINT Y;X",
            "40 GOTO 60",
            "50 NEXT",
            "60 NEXT Y",
        ],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), " 1  8 \n 2  8 \n");
}

#[test]
fn test_for_text_variable_is_type_mismatch() {
    let mut r = Basic::new();
    r.enter("FOR A$=1 TO 2");
    assert_eq!(exec(&mut r), "?TYPE MISMATCH ERROR\n");
}

#[test]
fn test_next_without_for() {
    let mut r = Basic::new();
    r.enter("NEXT");
    assert_eq!(exec(&mut r), "?NEXT WITHOUT FOR ERROR\n");
}

#[test]
fn test_gosub_and_return() {
    let mut r = Basic::new();
    program(&mut r, &["10 GOSUB 100", "20 END", "100 PRINT \"X\"", "110 RETURN"]);
    assert_eq!(r.enter("RUN"), Status::Executed);
    assert_eq!(exec(&mut r), "X\n");
}

#[test]
fn test_return_discards_loops_opened_in_subroutine() {
    let mut r = Basic::new();
    program(
        &mut r,
        &[
            "10 FOR I=1 TO 2",
            "20 GOSUB 100",
            "30 NEXT I",
            "40 END",
            "100 FOR J=1 TO 5",
            "110 PRINT I;J",
            "120 RETURN",
        ],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), " 1  1 \n 2  1 \n");
}

#[test]
fn test_return_without_gosub() {
    let mut r = Basic::new();
    r.enter("RETURN");
    assert_eq!(exec(&mut r), "?RETURN WITHOUT GOSUB ERROR\n");
}

#[test]
fn test_false_if_skips_rest_of_line() {
    let mut r = Basic::new();
    program(&mut r, &["10 IF 0 THEN PRINT \"A\": PRINT \"B\"", "20 PRINT \"C\""]);
    r.enter("RUN");
    assert_eq!(exec(&mut r), "C\n");
}

#[test]
fn test_if_then_line_number_and_goto() {
    let mut r = Basic::new();
    program(
        &mut r,
        &[
            "10 IF 1 THEN 40",
            "20 PRINT \"NO\"",
            "40 IF 2>1 GOTO 60",
            "50 PRINT \"NO\"",
            "60 PRINT \"YES\"",
        ],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), "YES\n");
}

#[test]
fn test_on_goto_and_gosub() {
    let mut r = Basic::new();
    program(
        &mut r,
        &[
            "10 ON 2 GOTO 100, 200",
            "100 PRINT \"A\": END",
            "200 ON 1 GOSUB 300",
            "210 PRINT \"BACK\": END",
            "300 PRINT \"SUB\": RETURN",
        ],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), "SUB\nBACK\n");
}

#[test]
fn test_on_out_of_range_falls_through() {
    let mut r = Basic::new();
    r.enter("ON 3 GOTO 10, 20: PRINT \"NEXT\"");
    assert_eq!(exec(&mut r), "NEXT\n");
}

#[test]
fn test_goto_missing_line_reports_and_lists() {
    let mut r = Basic::new();
    program(&mut r, &["10 GOTO 100"]);
    assert_eq!(r.enter("RUN"), Status::Error);
    assert_eq!(exec(&mut r), "?UNDEF'D STATEMENT ERROR IN 10\n10  GOTO 100\n");
}

#[test]
fn test_run_from_line() {
    let mut r = Basic::new();
    program(&mut r, &["10 PRINT 1", "20 PRINT 2"]);
    r.enter("RUN 20");
    assert_eq!(exec(&mut r), " 2 \n");
    r.enter("RUN 30");
    assert_eq!(exec(&mut r), "?UNDEF'D STATEMENT ERROR\n");
}

#[test]
fn test_syntax_error_at_entry_names_line() {
    let mut r = Basic::new();
    assert_eq!(r.enter("10 PRINT \"A"), Status::Error);
    assert_eq!(exec(&mut r), "?SYNTAX ERROR IN 10\n10  PRINT \"A\n");
}

#[test]
fn test_let_converts_by_suffix() {
    let mut r = Basic::new();
    r.enter("LET A%=7.9:B=A%/2:PRINT A%;B");
    assert_eq!(exec(&mut r), " 7  3.5 \n");
    r.enter("A$=5");
    assert_eq!(exec(&mut r), "?TYPE MISMATCH ERROR\n");
}

#[test]
fn test_dim_bounds() {
    let mut r = Basic::new();
    r.enter("DIM A(5)");
    r.enter("A(5)=42");
    r.enter("PRINT A(5)");
    assert_eq!(exec(&mut r), " 42 \n");
    r.enter("A(6)=1");
    assert_eq!(exec(&mut r), "?BAD SUBSCRIPT ERROR\n");
    r.enter("A(1,1)=1");
    assert_eq!(exec(&mut r), "?BAD SUBSCRIPT ERROR\n");
    r.enter("DIM B(1,1,1,1,1)");
    assert_eq!(exec(&mut r), "?BAD SUBSCRIPT ERROR\n");
}

#[test]
fn test_undimensioned_array_defaults_to_ten() {
    let mut r = Basic::new();
    r.enter("C(10)=3:PRINT C(10)");
    assert_eq!(exec(&mut r), " 3 \n");
    r.enter("C(11)=3");
    assert_eq!(exec(&mut r), "?BAD SUBSCRIPT ERROR\n");
}

#[test]
fn test_def_fn_both_spellings() {
    let mut r = Basic::new();
    r.enter("X=7");
    r.enter("DEF FN A(X) = X*X+1");
    r.enter("PRINT FNA(3); FN A(3); X");
    assert_eq!(exec(&mut r), " 10  10  7 \n");
    r.enter("PRINT FNA(1,2)");
    assert_eq!(exec(&mut r), "?ARGUMENT COUNT ERROR\n");
}

#[test]
fn test_def_without_fn_keeps_name() {
    let mut r = Basic::new();
    r.enter("DEF F(X)=X*2");
    r.enter("PRINT F(3)");
    assert_eq!(exec(&mut r), " 6 \n");
    r.enter("PRINT FNF(3)");
    assert_eq!(exec(&mut r), "?VARIABLE UNDEFINED ERROR\n");
}

#[test]
fn test_def_fn_text_and_empty_body() {
    let mut r = Basic::new();
    r.enter("DEF FNG$(N$)=\"HI \"+N$");
    r.enter("PRINT FNG$(\"BOB\")");
    assert_eq!(exec(&mut r), "HI BOB\n");
    r.enter("DEF FNB(X)=");
    assert_eq!(exec(&mut r), "?SYNTAX ERROR\n");
}

#[test]
fn test_read_data() {
    let mut r = Basic::new();
    program(
        &mut r,
        &[
            "10 DATA 1, -2, HELLO, \"A B\"",
            "20 READ A, B, C$, D$",
            "30 PRINT A; B; C$; D$",
            "40 READ E",
        ],
    );
    r.enter("RUN");
    assert_eq!(
        exec(&mut r),
        " 1  -2 HELLOA B\n?OUT OF DATA ERROR IN 40\n40  READ E\n"
    );
}

#[test]
fn test_read_type_mismatch_and_restore() {
    let mut r = Basic::new();
    program(
        &mut r,
        &["10 DATA 5", "20 DATA 6", "30 READ A: RESTORE 20: READ B", "40 PRINT A; B"],
    );
    r.enter("RUN");
    assert_eq!(exec(&mut r), " 5  6 \n");
    program(&mut r, &["40 READ A$"]);
    r.enter("RUN 40");
    assert_eq!(exec(&mut r), "?TYPE MISMATCH ERROR IN 40\n40  READ A$\n");
}

#[test]
fn test_list_and_delete_ranges() {
    let mut r = Basic::new();
    program(&mut r, &["10 PRINT 1", "20 PRINT 2", "30 PRINT 3"]);
    r.enter("LIST 20-");
    assert_eq!(exec(&mut r), "20  PRINT 2\n30  PRINT 3\n");
    r.enter("LIST -20");
    assert_eq!(exec(&mut r), "10  PRINT 1\n20  PRINT 2\n");
    r.enter("DELETE 20");
    r.enter("LIST");
    assert_eq!(exec(&mut r), "10  PRINT 1\n30  PRINT 3\n");
    r.enter("30");
    r.enter("LIST");
    assert_eq!(exec(&mut r), "10  PRINT 1\n");
}

#[test]
fn test_new_and_clr() {
    let mut r = Basic::new();
    program(&mut r, &["10 PRINT 1"]);
    r.enter("A=5:DEF FNX(Y)=Y+1");
    r.enter("CLR");
    r.enter("PRINT A; FNX(1)");
    assert_eq!(exec(&mut r), " 0  2 \n");
    r.enter("NEW");
    r.enter("LIST");
    assert_eq!(exec(&mut r), "");
    r.enter("PRINT FNX(1)");
    assert_eq!(exec(&mut r), "?VARIABLE UNDEFINED ERROR\n");
}

#[test]
fn test_dump_sorted() {
    let mut r = Basic::new();
    r.enter("B$=\"X\":A=1:DIM C(2,3)");
    r.enter("DUMP");
    let out = exec(&mut r);
    assert!(out.starts_with("MODULE \n"));
    let a = out.find("A = 1\n").unwrap();
    let b = out.find("B$ = \"X\"\n").unwrap();
    assert!(a < b);
    assert!(out.contains("C(2,3)\n"));
}

#[test]
fn test_unimplemented_and_syntax_statements() {
    let mut r = Basic::new();
    r.enter("THEN");
    assert_eq!(exec(&mut r), "?UNIMPLEMENTED COMMAND ERROR\n");
    r.enter("42");
    assert_eq!(r.enter("(1)"), Status::Error);
    assert_eq!(exec(&mut r), "?SYNTAX ERROR\n");
}

#[test]
fn test_auto_numbering() {
    let mut r = Basic::new();
    r.enter("AUTO 10");
    program(&mut r, &["100 PRINT 1"]);
    assert_eq!(r.runtime.auto_line(), Some(110));
    r.enter("110");
    assert_eq!(r.runtime.auto_line(), None);
}

#[test]
fn test_trace_prints_line_numbers() {
    let mut r = Basic::new();
    program(&mut r, &["10 TRON: A=1: B=2", "20 PRINT A+B"]);
    r.enter("RUN");
    assert_eq!(exec(&mut r), "[20] 3 \n");
}

#[test]
fn test_quit_returns_status() {
    let mut r = Basic::new();
    program(&mut r, &["10 PRINT 1", "20 QUIT 3", "30 PRINT 2"]);
    assert_eq!(r.enter("RUN"), Status::Quit(3));
    assert_eq!(exec(&mut r), " 1 \n");
}

#[test]
fn test_stop_breaks_without_listing() {
    let mut r = Basic::new();
    program(&mut r, &["10 STOP"]);
    r.enter("RUN");
    assert_eq!(exec(&mut r), "?BREAK IN 10\n");
}
