/// Returns a frequency count of the input data.
pub fn freqs(data: &[u8]) -> [u32; 256] {
    let mut freqs = [0_u32; 256];
    data.iter().for_each(|&el| freqs[el as usize] += 1);
    freqs
}

#[test]
fn freqs_test() {
    let f = freqs(b"banana");
    assert_eq!(f[b'a' as usize], 3);
    assert_eq!(f[b'n' as usize], 2);
    assert_eq!(f[b'b' as usize], 1);
    assert_eq!(f.iter().sum::<u32>(), 6);
}
