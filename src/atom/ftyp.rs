use super::*;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ftyp {
    pub size: Size,
    pub string: String,
}

impl Ftyp {
    pub fn parse(reader: &mut (impl Read + Seek), remaining: u64) -> crate::Result<Self> {
        let head = head::parse(reader, remaining)?;
        if head.fourcc() != FILETYPE {
            return Err(crate::Error::new(ErrorKind::NoFtyp, "No filetype atom found."));
        }

        let string = reader.read_utf8(head.content_len())?;

        Ok(Ftyp { size: head.size(), string })
    }
}
