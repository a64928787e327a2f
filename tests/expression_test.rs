mod common;
use common::*;

#[test]
fn test_precedence() {
    let mut r = Basic::new();
    r.enter("PRINT 1+2*3; (1+2)*3");
    assert_eq!(exec(&mut r), " 7  9 \n");
    r.enter("PRINT 2+3=5 AND 1");
    assert_eq!(exec(&mut r), " 1 \n");
    r.enter("PRINT -5+2");
    assert_eq!(exec(&mut r), " -3 \n");
}

#[test]
fn test_left_assoc() {
    let mut r = Basic::new();
    r.enter("PRINT 1.5/2*3");
    assert_eq!(exec(&mut r), " 2.25 \n");
    r.enter("PRINT 1.5/(2*3)");
    assert_eq!(exec(&mut r), " 0.25 \n");
}

#[test]
fn test_division_is_real() {
    let mut r = Basic::new();
    r.enter("PRINT 7/2; 1/3");
    assert_eq!(exec(&mut r), " 3.5  0.333333333 \n");
}

#[test]
fn test_power() {
    let mut r = Basic::new();
    r.enter("PRINT 2^10; 2^-1");
    assert_eq!(exec(&mut r), " 1024  0.5 \n");
}

#[test]
fn test_comparisons() {
    let mut r = Basic::new();
    r.enter("PRINT 1<2; 1=2; \"A\"<\"B\"");
    assert_eq!(exec(&mut r), " -1  0  -1 \n");
}

#[test]
fn test_text_concatenation() {
    let mut r = Basic::new();
    r.enter("A$=\"A\"+\"B\": PRINT A$; \"X\" \"Y\"");
    assert_eq!(exec(&mut r), "ABXY\n");
    r.enter("PRINT \"A\"-1");
    assert_eq!(exec(&mut r), "?TYPE MISMATCH ERROR\n");
}

#[test]
fn test_malformed_expressions() {
    let mut r = Basic::new();
    r.enter("PRINT 1+");
    assert_eq!(exec(&mut r), "?SYNTAX ERROR\n");
    r.enter("PRINT (1+2");
    assert_eq!(exec(&mut r), "?SYNTAX ERROR\n");
}

#[test]
fn test_print_comma_moves_to_next_zone() {
    let mut r = Basic::new();
    r.enter("PRINT 1, 2");
    assert_eq!(exec(&mut r), format!(" 1 {} 2 \n", " ".repeat(7)));
}
