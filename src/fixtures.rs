#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};

    use crate::schema::{Field, Schema};

    // -- The end-to-end fixture: one required flag, one hidden leaf ---------

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct RootConfig {
        pub foo: String,
        pub bar: i64,
        pub child: ChildConfig,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct ChildConfig {
        pub decimal: f32,
        pub boolean: bool,
        pub hidden: String,
    }

    impl Schema for RootConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<String>("Foo").desc("foo").required(),
                Field::leaf::<i64>("Bar").desc("bar").default("2"),
                Field::nested::<ChildConfig>("Child"),
            ]
        }
    }

    impl Schema for ChildConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<f32>("Decimal").desc("decimal").default("1.2"),
                Field::leaf::<bool>("Boolean").desc("boolean").default("true"),
                Field::leaf::<String>("Hidden")
                    .desc("hidden")
                    .default("hide and seek")
                    .hidden(),
            ]
        }
    }

    // -- Four levels of nesting, alternating required / hidden -------------

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct DeepConfig {
        pub foo: String,
        pub bar: String,
        pub sc: StringSection,
    }

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct StringSection {
        pub foostring: String,
        pub barstring: String,
        pub ic: IntSection,
    }

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct IntSection {
        pub fooint: i64,
        pub barint: i64,
        pub bc: BoolSection,
    }

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct BoolSection {
        pub foobool: bool,
        pub barbool: bool,
    }

    impl Schema for DeepConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<String>("foo").desc("foo").default("foo").required(),
                Field::leaf::<String>("bar").desc("bar").default("bar").hidden(),
                Field::nested::<StringSection>("sc"),
            ]
        }
    }

    impl Schema for StringSection {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<String>("foostring")
                    .desc("foostring")
                    .default("foostring")
                    .required(),
                Field::leaf::<String>("barstring").desc("barstring").hidden(),
                Field::nested::<IntSection>("ic"),
            ]
        }
    }

    impl Schema for IntSection {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<i64>("fooint").desc("fooint").default("1").required(),
                Field::leaf::<i64>("barint").desc("barint").hidden(),
                Field::nested::<BoolSection>("bc"),
            ]
        }
    }

    impl Schema for BoolSection {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<bool>("foobool")
                    .desc("foobool")
                    .default("true")
                    .required(),
                Field::leaf::<bool>("barbool").desc("barbool").hidden(),
            ]
        }
    }

    // -- Single float leaf ----------------------------------------------------

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct FloatConfig {
        pub foofloat: f32,
    }

    impl Schema for FloatConfig {
        fn fields() -> Vec<Field> {
            vec![Field::leaf::<f32>("foofloat").desc("foofloat").default("1.23")]
        }
    }

    // -- A leaf kind that cannot become a flag -------------------------------

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct UintConfig {
        pub name: String,
        pub retries: u32,
    }

    impl Schema for UintConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<String>("name").desc("name"),
                Field::leaf::<u32>("retries").desc("retries").default("3"),
            ]
        }
    }

    /// Same struct, with the unsupported leaf kept off the command line.
    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct HiddenUintConfig {
        pub name: String,
        pub retries: u32,
    }

    impl Schema for HiddenUintConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<String>("name").desc("name"),
                Field::leaf::<u32>("retries").desc("retries").default("3").hidden(),
            ]
        }
    }

    // -- Numeric leaves narrower than the TOML value types -------------------

    #[derive(Deserialize, Debug, Default, PartialEq)]
    pub struct NarrowConfig {
        pub small: i32,
        pub ratio: f32,
        pub scale: f64,
    }

    impl Schema for NarrowConfig {
        fn fields() -> Vec<Field> {
            vec![
                Field::leaf::<i32>("small").desc("small"),
                Field::leaf::<f32>("ratio").desc("ratio"),
                Field::leaf::<f64>("scale").desc("scale").default("1.0").hidden(),
            ]
        }
    }

    #[test]
    fn fixtures_declare_their_fields() {
        assert_eq!(RootConfig::fields().len(), 3);
        assert_eq!(ChildConfig::fields().len(), 3);
        assert_eq!(FloatConfig::fields().len(), 1);
    }
}
