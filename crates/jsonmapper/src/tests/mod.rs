mod arbitrary;

mod property_roundtrip;
