use four_cc::FourCC;

use bytes::{BufMut, BytesMut};

use crate::Mp4BoxError;
use crate::{FullBoxHeader, Mp4Box};

pub struct DataEntryUrnBox {
    pub name: String,
    pub location: String,
}

impl DataEntryUrnBox {
    pub fn new(name: String, location: String) -> Self {
        DataEntryUrnBox { name, location }
    }
}

impl Mp4Box for DataEntryUrnBox {
    const NAME: FourCC = FourCC(*b"urn ");

    fn get_full_box_header(&self) -> Option<FullBoxHeader> {
        Some(FullBoxHeader::new(0, 0))
    }

    fn content_size(&self) -> u64 {
        self.name.as_bytes().len() as u64 + 1 + self.location.as_bytes().len() as u64 + 1
    }

    fn write_box_contents(&self, writer: &mut BytesMut) -> Result<(), Mp4BoxError> {
        writer.put_slice(self.name.as_bytes());
        writer.put_u8(0);
        writer.put_slice(self.location.as_bytes());
        writer.put_u8(0);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_strings_are_terminated() {
        let urn = DataEntryUrnBox::new(String::from("urn:x"), String::new());

        let mut buf = BytesMut::new();
        urn.write(&mut buf).unwrap();

        assert_eq!(urn.size(), 12 + 7);
        assert_eq!(&buf[12..], b"urn:x\0\0");
    }
}
