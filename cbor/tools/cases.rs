/*!
Built-in conformance cases.

Each group becomes one fixture file. Success cases record the expected value;
failure cases record a fragment of the expected error message, which is
checked here but not written out.
*/

use tessera_cbor::{
    Map, Tag, Value,
    fixture::{ErrorCase, Record, SuccessCase},
};

/// A named set of cases, written to `<name>.json`.
pub struct Group<T> {
    pub name: &'static str,
    pub cases: Vec<T>,
}

/// An input that must decode to `expect`, consuming every byte.
pub struct Success {
    pub description: String,
    pub input: Vec<u8>,
    pub expect: Value,
}

/// An input that must fail with an error whose message contains `message`.
pub struct Failure {
    pub description: String,
    pub input: Vec<u8>,
    pub message: &'static str,
}

impl Success {
    pub fn record(&self) -> Record {
        SuccessCase::new(self.description.clone(), &self.input, &self.expect).into()
    }
}

impl Failure {
    pub fn record(&self) -> Record {
        ErrorCase::new(self.description.clone(), &self.input).into()
    }

    /// Decodes the input and checks the error message.
    pub fn check(&self) -> Result<(), String> {
        match tessera_cbor::decode(&self.input) {
            Ok((value, _)) => Err(format!("expected error '{}', got {value}", self.message)),
            Err(e) if e.to_string().contains(self.message) => Ok(()),
            Err(e) => Err(format!("expected error '{}', got '{e}'", self.message)),
        }
    }
}

/// A single encoded item and its value, shared by the atomic, list and map groups.
struct Atom {
    name: String,
    input: Vec<u8>,
    value: Value,
}

fn atom(name: impl Into<String>, input: impl Into<Vec<u8>>, value: Value) -> Atom {
    Atom {
        name: name.into(),
        input: input.into(),
        value,
    }
}

/// The text string "foo", used as the key of every map case.
const MAP_KEY_FOO: [u8; 4] = [3 << 5 | 3, 0x66, 0x6f, 0x6f];

fn integers(major: u8, name: &str, atoms: &mut Vec<Atom>) {
    let head = major << 5;
    let value = |arg: u64| {
        if major == 0 {
            Value::Uint(arg)
        } else {
            Value::NegInt(arg + 1)
        }
    };

    atoms.push(atom(format!("{name}/0/min"), [head], value(0)));
    atoms.push(atom(format!("{name}/0/max"), [head | 23], value(23)));
    for (minor, width) in [(24u8, 1usize), (25, 2), (26, 4), (27, 8)] {
        let max = match width {
            // The largest negative integer argument whose magnitude still fits
            8 if major == 1 => u64::MAX - 1,
            8 => u64::MAX,
            w => (1u64 << (8 * w)) - 1,
        };
        for (label, arg) in [("min", 0), ("max", max)] {
            let mut input = vec![head | minor];
            input.extend_from_slice(&arg.to_be_bytes()[8 - width..]);
            atoms.push(atom(format!("{name}/{width}/{label}"), input, value(arg)));
        }
    }
}

fn atoms() -> Vec<Atom> {
    let mut atoms = Vec::new();
    integers(0, "uint", &mut atoms);
    integers(1, "negint", &mut atoms);
    atoms.extend([
        atom("true", [0xf5], Value::Bool(true)),
        atom("false", [0xf4], Value::Bool(false)),
        atom("null", [0xf6], Value::Nil),
        atom("undefined", [0xf7], Value::Undefined),
        atom(
            "float16/+Inf",
            [0xf9, 0x7c, 0],
            Value::Float32(f32::from_bits(0x7f80_0000)),
        ),
        atom(
            "float16/-Inf",
            [0xf9, 0xfc, 0],
            Value::Float32(f32::from_bits(0xff80_0000)),
        ),
        atom(
            "float16/NaN/MSB",
            [0xf9, 0x7e, 0],
            Value::Float32(f32::from_bits(0x7fc0_0000)),
        ),
        atom(
            "float16/NaN/LSB",
            [0xf9, 0x7c, 1],
            Value::Float32(f32::from_bits(0x7f80_2000)),
        ),
        atom(
            "float32",
            [0xfa, 0x7f, 0x80, 0, 0],
            Value::Float32(f32::from_bits(0x7f80_0000)),
        ),
        atom(
            "float64",
            [0xfb, 0x7f, 0xf0, 0, 0, 0, 0, 0, 0],
            Value::Float64(f64::from_bits(0x7ff0_0000_0000_0000)),
        ),
    ]);
    atoms
}

fn success(prefix: &str, name: &str, input: impl Into<Vec<u8>>, expect: Value) -> Success {
    Success {
        description: format!("{prefix} - {name}"),
        input: input.into(),
        expect,
    }
}

fn foo(value: Value) -> Value {
    Value::Map(Map::from([(b"foo".to_vec(), value)]))
}

fn tagged(id: u64, value: Value) -> Value {
    Value::Tag(Tag {
        id,
        value: Box::new(value),
    })
}

/// Cases for a byte (major 2) or text (major 3) string, built around the content "foo".
fn strings(major: u8, prefix: &str, indefinite: bool, make: fn(&[u8]) -> Value) -> Vec<Success> {
    let head = major << 5;
    let foo = [head | 3, 0x66, 0x6f, 0x6f];
    let empty = head;
    let chunked = |chunks: &[&[u8]]| -> Vec<u8> {
        let mut input = vec![head | 31];
        input.extend(chunks.concat());
        input.push(0xff);
        input
    };

    if !indefinite {
        return vec![
            success(prefix, "len = 0", [empty], make(b"")),
            success(prefix, "len > 0", foo, make(b"foo")),
        ];
    }
    vec![
        success(prefix, "len = 0", chunked(&[] as &[&[u8]]), make(b"")),
        success(prefix, "len = 0, explicit", chunked(&[&[empty][..]]), make(b"")),
        success(
            prefix,
            "len = 0, len > 0",
            chunked(&[&[empty][..], &foo[..]]),
            make(b"foo"),
        ),
        success(
            prefix,
            "len > 0, len = 0",
            chunked(&[&foo[..], &[empty][..]]),
            make(b"foo"),
        ),
        success(
            prefix,
            "len > 0, len > 0",
            chunked(&[&foo[..], &foo[..]]),
            make(b"foofoo"),
        ),
    ]
}

fn lists() -> Vec<Success> {
    let atoms = atoms();
    let definite = atoms.iter().map(|a| {
        let mut input = vec![4 << 5 | 1];
        input.extend_from_slice(&a.input);
        success(
            "list",
            &format!("[{}]", a.name),
            input,
            Value::List(vec![a.value.clone()]),
        )
    });
    let indefinite = atoms.iter().map(|a| {
        let mut input = vec![4 << 5 | 31];
        input.extend_from_slice(&a.input);
        input.push(0xff);
        success(
            "list",
            &format!("[_ {}]", a.name),
            input,
            Value::List(vec![a.value.clone()]),
        )
    });
    definite.chain(indefinite).collect()
}

fn maps() -> Vec<Success> {
    let atoms = atoms();
    let definite = atoms.iter().map(|a| {
        let mut input = vec![5 << 5 | 1];
        input.extend_from_slice(&MAP_KEY_FOO);
        input.extend_from_slice(&a.input);
        success("map", &format!("{{{}}}", a.name), input, foo(a.value.clone()))
    });
    let indefinite = atoms.iter().map(|a| {
        let mut input = vec![5 << 5 | 31];
        input.extend_from_slice(&MAP_KEY_FOO);
        input.extend_from_slice(&a.input);
        input.push(0xff);
        success(
            "map",
            &format!("{{_ {}}}", a.name),
            input,
            foo(a.value.clone()),
        )
    });
    let mut cases: Vec<Success> = definite.chain(indefinite).collect();

    // A repeated key keeps its last value
    let mut input = vec![5 << 5 | 2];
    input.extend_from_slice(&MAP_KEY_FOO);
    input.push(1);
    input.extend_from_slice(&MAP_KEY_FOO);
    input.push(2);
    cases.push(success("map", "{foo, foo}", input, foo(Value::Uint(2))));
    cases
}

fn tags() -> Vec<Success> {
    let head = 6 << 5;
    let mut cases = vec![
        success("tag", "0/min", [head, 1], tagged(0, Value::Uint(1))),
        success("tag", "0/max", [head | 23, 1], tagged(23, Value::Uint(1))),
    ];
    for (minor, width) in [(24u8, 1usize), (25, 2), (26, 4), (27, 8)] {
        let max = if width == 8 {
            u64::MAX
        } else {
            (1u64 << (8 * width)) - 1
        };
        for (label, id) in [("min", 0), ("max", max)] {
            let mut input = vec![head | minor];
            input.extend_from_slice(&id.to_be_bytes()[8 - width..]);
            input.push(1);
            cases.push(success(
                "tag",
                &format!("{width}/{label}"),
                input,
                tagged(id, Value::Uint(1)),
            ));
        }
    }
    cases
}

/// Every group of inputs that must decode.
pub fn success_groups() -> Vec<Group<Success>> {
    let slice = |b: &[u8]| Value::Slice(b.to_vec());
    let string = |b: &[u8]| Value::String(b.to_vec());
    vec![
        Group {
            name: "TestDecode_Atomic",
            cases: atoms()
                .into_iter()
                .map(|a| success("atomic", &a.name, a.input, a.value))
                .collect(),
        },
        Group {
            name: "TestDecode_DefiniteSlice",
            cases: strings(2, "definite slice", false, slice),
        },
        Group {
            name: "TestDecode_IndefiniteSlice",
            cases: strings(2, "indefinite slice", true, slice),
        },
        Group {
            name: "TestDecode_DefiniteString",
            cases: strings(3, "definite string", false, string),
        },
        Group {
            name: "TestDecode_IndefiniteString",
            cases: strings(3, "indefinite string", true, string),
        },
        Group {
            name: "TestDecode_List",
            cases: lists(),
        },
        Group {
            name: "TestDecode_Map",
            cases: maps(),
        },
        Group {
            name: "TestDecode_Tag",
            cases: tags(),
        },
    ]
}

const ARG_LEN: [&str; 4] = [
    "arg len 1 greater than remaining buf len",
    "arg len 2 greater than remaining buf len",
    "arg len 4 greater than remaining buf len",
    "arg len 8 greater than remaining buf len",
];

fn invalid_argument() -> Vec<(String, Vec<u8>, &'static str)> {
    let mut cases = Vec::new();
    for (major, name) in [
        (0u8, "uint"),
        (1, "negint"),
        (2, "slice"),
        (3, "string"),
        (4, "list"),
        (5, "map"),
        (6, "tag"),
    ] {
        // Each argument is one byte short
        for ((minor, width), message) in [(24u8, 1usize), (25, 2), (26, 4), (27, 8)]
            .into_iter()
            .zip(ARG_LEN)
        {
            let mut input = vec![major << 5 | minor];
            input.resize(width, 0);
            cases.push((format!("{name}/{width}"), input, message));
        }
        if matches!(major, 0 | 1 | 6) {
            cases.push((
                format!("{name}/?"),
                vec![major << 5 | 31],
                "unexpected minor value 31",
            ));
        }
    }
    cases.extend([
        (
            "negint/8/overflow".to_string(),
            vec![1 << 5 | 27, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            "negative integer magnitude exceeds 64 bits",
        ),
        (
            "major7/float16".to_string(),
            vec![7 << 5 | 25, 0],
            "incomplete float16 at end of buf",
        ),
        (
            "major7/float32".to_string(),
            vec![7 << 5 | 26, 0, 0, 0],
            "incomplete float32 at end of buf",
        ),
        (
            "major7/float64".to_string(),
            vec![7 << 5 | 27, 0, 0, 0, 0, 0, 0, 0],
            "incomplete float64 at end of buf",
        ),
        (
            "major7/simple".to_string(),
            vec![7 << 5 | 24, 0xff],
            "unexpected minor value 24",
        ),
        (
            "major7/?".to_string(),
            vec![7 << 5 | 31],
            "unexpected minor value 31",
        ),
    ]);
    cases
}

fn failures(
    group: &str,
    cases: impl IntoIterator<Item = (String, Vec<u8>, &'static str)>,
) -> Vec<Failure> {
    cases
        .into_iter()
        .map(|(name, input, message)| Failure {
            description: format!("{group} - {name} - {message}"),
            input,
            message,
        })
        .collect()
}

fn case(name: &str, input: &[u8], message: &'static str) -> (String, Vec<u8>, &'static str) {
    (name.to_string(), input.to_vec(), message)
}

/// Every group of inputs that must fail.
pub fn error_groups() -> Vec<Group<Failure>> {
    let too_deep = {
        let mut input = vec![4 << 5 | 1; tessera_cbor::decode::DEFAULT_MAX_DEPTH + 1];
        input.push(0);
        input
    };

    vec![
        Group {
            name: "TestDecodeError_InvalidArgument",
            cases: failures("TestDecode_InvalidArgument", invalid_argument()),
        },
        Group {
            name: "TestDecodeError_InvalidSlice",
            cases: failures(
                "TestDecode_InvalidSlice",
                vec![
                    case(
                        "slice/1, not enough bytes",
                        &[2 << 5 | 24, 1],
                        "slice len 1 greater than remaining buf len",
                    ),
                    case("slice/?, no break", &[2 << 5 | 31], "expected break marker"),
                    case(
                        "slice/?, invalid nested major",
                        &[2 << 5 | 31, 3 << 5],
                        "unexpected major type 3 in indefinite slice",
                    ),
                    case(
                        "slice/?, nested indefinite",
                        &[2 << 5 | 31, 2 << 5 | 31],
                        "nested indefinite slice",
                    ),
                    case(
                        "slice/?, invalid nested definite",
                        &[2 << 5 | 31, 2 << 5 | 24, 1],
                        "decode subslice: slice len 1 greater than remaining buf len",
                    ),
                    case(
                        "string/1, not enough bytes",
                        &[3 << 5 | 24, 1],
                        "slice len 1 greater than remaining buf len",
                    ),
                    case("string/?, no break", &[3 << 5 | 31], "expected break marker"),
                    case(
                        "string/?, invalid nested major",
                        &[3 << 5 | 31, 2 << 5],
                        "unexpected major type 2 in indefinite slice",
                    ),
                    case(
                        "string/?, nested indefinite",
                        &[3 << 5 | 31, 3 << 5 | 31],
                        "nested indefinite slice",
                    ),
                    case(
                        "string/?, invalid nested definite",
                        &[3 << 5 | 31, 3 << 5 | 24, 1],
                        "decode subslice: slice len 1 greater than remaining buf len",
                    ),
                ],
            ),
        },
        Group {
            name: "TestDecodeError_InvalidList",
            cases: failures(
                "TestDecode_InvalidList",
                vec![
                    case("[] / eof after head", &[4 << 5 | 1], "unexpected end of payload"),
                    case("[] / invalid item", &[4 << 5 | 1, 24], ARG_LEN[0]),
                    case("[_ ] / no break", &[4 << 5 | 31], "expected break marker"),
                    case("[_ ] / invalid item", &[4 << 5 | 31, 24], ARG_LEN[0]),
                ],
            ),
        },
        Group {
            name: "TestDecodeError_InvalidMap",
            cases: failures(
                "TestDecode_InvalidMap",
                vec![
                    case("{} / eof after head", &[5 << 5 | 1], "unexpected end of payload"),
                    case(
                        "{} / non-string key",
                        &[5 << 5 | 1, 0],
                        "unexpected major type 0 for map key",
                    ),
                    case(
                        "{} / invalid key",
                        &[5 << 5 | 1, 3 << 5 | 24, 1],
                        "slice len 1 greater than remaining buf len",
                    ),
                    case(
                        "{} / invalid value",
                        &[5 << 5 | 1, 3 << 5 | 3, 0x66, 0x6f, 0x6f, 24],
                        ARG_LEN[0],
                    ),
                    case(
                        "{} / missing value",
                        &[5 << 5 | 1, 3 << 5 | 3, 0x66, 0x6f, 0x6f],
                        "unexpected end of payload",
                    ),
                    case("{_ } / no break", &[5 << 5 | 31], "expected break marker"),
                    case(
                        "{_ } / non-string key",
                        &[5 << 5 | 31, 0],
                        "unexpected major type 0 for map key",
                    ),
                    case(
                        "{_ } / invalid key",
                        &[5 << 5 | 31, 3 << 5 | 24, 1],
                        "slice len 1 greater than remaining buf len",
                    ),
                    case(
                        "{_ } / invalid value",
                        &[5 << 5 | 31, 3 << 5 | 3, 0x66, 0x6f, 0x6f, 24],
                        ARG_LEN[0],
                    ),
                ],
            ),
        },
        Group {
            name: "TestDecodeError_InvalidTag",
            cases: failures(
                "TestDecode_InvalidTag",
                vec![
                    case("invalid value", &[6 << 5 | 1, 24], ARG_LEN[0]),
                    case("eof", &[6 << 5 | 1], "unexpected end of payload"),
                ],
            ),
        },
        Group {
            name: "TestDecodeError_Depth",
            cases: failures(
                "TestDecode_Depth",
                [case(
                    "list nesting",
                    &too_deep,
                    "maximum nesting depth 128 exceeded",
                )],
            ),
        },
    ]
}
