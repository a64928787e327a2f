mod common;
use basic::mach::Val;
use common::*;

#[test]
fn test_fn_substrings() {
    let mut r = Basic::new();
    r.enter("PRINT LEFT$(\"HELLO\", 2); RIGHT$(\"HELLO\", 2)");
    assert_eq!(exec(&mut r), "HELO\n");
    r.enter("PRINT MID$(\"HELLO\", 2, 3); LEN(\"HELLO\")");
    assert_eq!(exec(&mut r), "ELL 5 \n");
}

#[test]
fn test_fn_tab_and_spc() {
    let mut r = Basic::new();
    r.enter("PRINT \"A\"; TAB(5); \"B\"");
    assert_eq!(exec(&mut r), "A    B\n");
    r.enter("PRINT \"A\"; SPC(2); \"B\"");
    assert_eq!(exec(&mut r), "A  B\n");
    r.enter("A$=SPC(9000000000000000000)");
    assert_eq!(exec(&mut r), "?ILLEGAL QUANTITY ERROR\n");
}

#[test]
fn test_fn_chr_asc() {
    let mut r = Basic::new();
    r.enter("PRINT CHR$(65); ASC(\"B\")");
    assert_eq!(exec(&mut r), "A 66 \n");
}

#[test]
fn test_fn_argument_count() {
    let mut r = Basic::new();
    r.enter("PRINT LEN(\"A\", \"B\")");
    assert_eq!(exec(&mut r), "?ARGUMENT COUNT ERROR\n");
}

#[test]
fn test_print_using() {
    let mut r = Basic::new();
    r.enter("PRINT USING \"###.##\"; 3.14159");
    assert_eq!(exec(&mut r), "  3.14\n");
    r.enter("PRINT USING \"ABC\"; 1");
    assert_eq!(exec(&mut r), "?ILLEGAL QUANTITY ERROR\n");
}

#[test]
fn test_peek_and_poke() {
    let mut r = Basic::new();
    r.enter("POKE 100, 42: PRINT PEEK(100)");
    assert_eq!(exec(&mut r), " 42 \n");
    r.enter("POKE 100, 256");
    assert_eq!(exec(&mut r), "?ILLEGAL QUANTITY ERROR\n");
}

#[test]
fn test_host_registered_function_and_command() {
    let mut r = Basic::new();
    r.runtime
        .add_function("DOUBLE", |_, args| Ok(Val::Real(args[0].to_f64()? * 2.0)));
    r.runtime.add_command("HELLO", |runtime, _| {
        runtime.print("HI\n");
        Ok(())
    });
    r.enter("PRINT DOUBLE(4)");
    assert_eq!(exec(&mut r), " 8 \n");
    r.enter("HELLO");
    assert_eq!(exec(&mut r), "HI\n");
}
