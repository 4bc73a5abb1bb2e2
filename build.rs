fn main() {
    // Migrations and locale tables are embedded with include_str!
    println!("cargo:rerun-if-changed=migrations/");
    println!("cargo:rerun-if-changed=locales/");
}
