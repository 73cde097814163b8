// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(feature = "serde")]
mod tests {
    use nbt_region::nbt::serde_impl::{from_nbt, to_nbt};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestStruct {
        name: String,
        age: i32,
        active: bool,
        scores: Vec<i32>,
        metadata: Meta,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Meta {
        version: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    enum Kind {
        Overworld,
        Nether { light_level: i32 },
        TheEnd(bool),
    }

    #[test]
    fn struct_to_nbt_round_trips() {
        let original = TestStruct {
            name: "Steve".to_owned(),
            age: 25,
            active: true,
            scores: vec![10, 20, 30],
            metadata: Meta {
                version: "1.0".to_owned(),
                tags: vec!["player".to_owned(), "admin".to_owned()],
            },
        };

        let nbt = to_nbt(&original).unwrap();
        let decoded: TestStruct = from_nbt(nbt).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn enum_variants_round_trip() {
        for original in [
            Kind::Overworld,
            Kind::Nether { light_level: 7 },
            Kind::TheEnd(true),
        ] {
            let nbt = to_nbt(&original).unwrap();
            let decoded: Kind = from_nbt(nbt).unwrap();
            assert_eq!(original, decoded);
        }
    }

    #[test]
    fn binary_round_trip_via_serde_and_the_wire_codec() {
        use nbt_region::nbt::encode::write_named_tag;
        use nbt_region::nbt::parse::parse_named_tag;

        let original = TestStruct {
            name: "Alex".to_owned(),
            age: 30,
            active: false,
            scores: vec![1, 2, 3],
            metadata: Meta {
                version: "2.0".to_owned(),
                tags: vec!["vip".to_owned()],
            },
        };

        let tag = to_nbt(&original).unwrap();

        let mut buf = Vec::new();
        write_named_tag(&mut buf, "root", &tag).unwrap();

        let mut input = &buf[..];
        let (name, decoded_tag) = parse_named_tag(&mut input).unwrap();
        assert_eq!(name, "root");

        let decoded: TestStruct = from_nbt(decoded_tag).unwrap();
        assert_eq!(original, decoded);
    }
}
