/// Read / write float arrays as raw little-endian binary

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Scalar types which can be stored in raw files
pub trait RawElement: Copy {
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;
    fn to_le(self) -> Self::Bytes;
    fn from_le(bytes: Self::Bytes) -> Self;
}

macro_rules! raw_element {
    ($($t:ty)*) => {$(
        impl RawElement for $t {
            type Bytes = [u8; std::mem::size_of::<$t>()];
            fn to_le(self) -> Self::Bytes { self.to_le_bytes() }
            fn from_le(bytes: Self::Bytes) -> Self { <$t>::from_le_bytes(bytes) }
        }
    )*};
}

raw_element!(f32 f64);

pub fn write<T: RawElement>(data: impl Iterator<Item = T>, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(datum.to_le().as_ref())?;
    }
    buf.flush()
}

type IORes<T> = std::io::Result<T>;

/// Lazily read consecutive elements until the end of the file. A trailing
/// incomplete element is ignored.
pub fn read<'a, T: RawElement + 'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<T>> + 'a> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        let mut bytes = T::Bytes::default();
        match buf.read_exact(bytes.as_mut()) {
            Ok(()) => Some(Ok(T::from_le(bytes))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Read the whole file, which must contain exactly `n` elements
pub fn read_exactly<T: RawElement>(path: &Path, n: usize) -> IORes<Vec<T>> {
    let data: Vec<T> = read(path)?.collect::<Result<_, _>>()?;
    if data.len() != n {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} contains {} elements, expected {n}", path.display(), data.len()),
        ))
    }
    Ok(data)
}
