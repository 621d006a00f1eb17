use huffcode::{compress_bytes, decompress_bytes};

fn main() -> huffcode::Result<()> {
    let s = String::from("Hello my name is Sam!");
    let packed = compress_bytes(s.as_bytes())?;
    let dec = String::from_utf8(decompress_bytes(&packed)?);

    println!("{} bytes -> {} bytes", s.len(), packed.len());
    println!("{:?}", dec);

    Ok(())
}
