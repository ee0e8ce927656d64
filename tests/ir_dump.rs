mod common;

use paste::paste;
use pretty_assertions::assert_str_eq;

use sufc::source::SourceBuffer;

macro_rules! golden_test {
    ($( $name:ident ($pinhole:expr, $ssa:expr): $src:expr => $expected:expr; )+) => {
        $(
            paste! {
                #[test]
                fn [< dump_ $name >]() {
                    let mut source_buf = SourceBuffer::new();
                    let cfg = common::compile(&mut source_buf, $src, $pinhole, $ssa);

                    assert_str_eq!(common::dump(&cfg), $expected);
                }
            }
        )+
    };
}

golden_test! {
    print_constant(true, true):
        "main with :\nprint(5)\n" =>
        "data:\n\
         \n\
         code:\n\
         \n\
         main:\n\
         \tprint(11)\n\
         \tret 0\n\
         \n";

    arithmetic_reassignment(true, true):
        "main with a:\na = 3\na = (a + 4)\nprint(a)\n" =>
        "data:\n\
         \n\
         code:\n\
         \n\
         main:\n\
         \t%a1 = 1\n\
         \t%a2 = 7\n\
         \t%tmp1v1 = %a2 & 1\n\
         \tif %tmp1v1 then main1 else main2\n\
         main1:\n\
         \t%a3 = %a2 / 2\n\
         \t%a4 = %a3 + 9\n\
         \t%a5 = %a4 * 2\n\
         \t%a6 = %a5 ^ 1\n\
         \t%tmp2v1 = %a6 & 1\n\
         \tif %tmp2v1 then main3 else main4\n\
         main2:\n\
         \tfail NotANumber\n\
         main3:\n\
         \t%a7 = %a6 / 2\n\
         \tprint(%a7)\n\
         \t%a8 = %a7 * 2\n\
         \t%a9 = %a8 ^ 1\n\
         \tret 0\n\
         main4:\n\
         \tfail NotANumber\n\
         \n";

    field_store_and_load(true, false):
        "class C [\nfields x\n]\nmain with c:\nc = @C\n!c.x = 7\nprint(&c.x)\n" =>
        "data:\n\
         global array vtableC: {  }\n\
         global array ftableC: { 2 }\n\
         \n\
         \n\
         code:\n\
         \n\
         main:\n\
         \t%c = 1\n\
         \t%c = alloc(3)\n\
         \tstore(%c, @vtableC)\n\
         \t%tmp1v = %c + 8\n\
         \tstore(%tmp1v, @ftableC)\n\
         \t%c = %c * 2\n\
         \t%tmp2v = %c & 1\n\
         \tif %tmp2v then main2 else main1\n\
         main1:\n\
         \t%c = %c / 2\n\
         \t%tmp3v = %c + 8\n\
         \t%tmp4v = load(%tmp3v)\n\
         \t%tmp5v = getelt(%tmp4v, 0)\n\
         \tif %tmp5v then main3 else main4\n\
         main2:\n\
         \tfail NotAPointer\n\
         main3:\n\
         \t%tmp6v = %c + %tmp5v\n\
         \tstore(%tmp6v, 15)\n\
         \t%c = %c * 2\n\
         \t%tmp7v = %c & 1\n\
         \tif %tmp7v then main6 else main5\n\
         main4:\n\
         \tfail NoSuchField\n\
         main5:\n\
         \t%c = %c / 2\n\
         \t%tmp9v = %c + 8\n\
         \t%tmp10v = load(%tmp9v)\n\
         \t%tmp11v = getelt(%tmp10v, 0)\n\
         \tif %tmp11v then main8 else main7\n\
         main6:\n\
         \tfail NotAPointer\n\
         main7:\n\
         \tfail NoSuchField\n\
         main8:\n\
         \t%tmp12v = %c + %tmp11v\n\
         \t%tmp8v = load(%tmp12v)\n\
         \t%c = %c * 2\n\
         \t%tmp13v = %tmp8v & 1\n\
         \tif %tmp13v then main9 else main10\n\
         main9:\n\
         \t%tmp8v = %tmp8v / 2\n\
         \tprint(%tmp8v)\n\
         \t%tmp8v = %tmp8v * 2\n\
         \t%tmp8v = %tmp8v ^ 1\n\
         \tret 0\n\
         main10:\n\
         \tfail NotANumber\n\
         \n";
}

/// A class method's entry label carries its parameter list.
#[test]
fn entry_label_is_decorated_with_params() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class C [\nmethod add(this, k):\nreturn k\n]\nmain with :\nprint(1)\n",
        true,
        false,
    );

    let dumped = common::dump(&cfg);

    assert!(dumped.contains("C_add(this, k):\n"));
    assert!(dumped.contains("\nmain:\n"));
}
