/// Borrowed view over a piece of (decoded) response body.
///
/// The bytes are only valid for the duration of the callback they are handed to. Peers that
/// need to keep the data must copy it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DataChunk<'a> {
    data: &'a [u8],
    encoded_data_length: usize,
}

impl<'a> DataChunk<'a> {
    /// `encoded_data_length` is the number of bytes this chunk took on the wire, which can differ
    /// from `data.len()` for compressed transfers.
    pub fn new(data: &'a [u8], encoded_data_length: usize) -> Self {
        Self { data, encoded_data_length }
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.encoded_data_length
    }
}
