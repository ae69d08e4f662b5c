use anyhow::Context;
use jsontree::{parse, Value};

fn main() -> anyhow::Result<()> {
    let doc = Value::new();
    doc.set("a", true)?;
    doc.set("b", 5)?;
    doc.set("c", "ololo")?;
    doc.set(
        "top kek",
        vec![Value::from([Value::from(5), true.into()]), "ololo".into()],
    )?;

    let text = doc.stringify()?;
    println!("{}", text);

    let parsed = parse(&text).context("re-parsing the sample document")?;
    println!("{}", parsed.stringify()?);

    Ok(())
}
