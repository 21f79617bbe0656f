include!(concat!(env!("OUT_DIR"), "/models.rs"));
