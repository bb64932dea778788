//! Aligned per-element buffer access without a GPU.

use vkframe_rhi::buffer::{BufferLayout, align};

#[test]
fn test_two_elements_of_68_bytes_with_64_byte_alignment() {
    let layout = BufferLayout::new(68, 2, 64);
    assert_eq!(layout.aligned_size(), 128);
    assert_eq!(layout.total_size(), 256);

    let mut memory = vec![0u8; layout.total_size() as usize];
    let first = [0xAAu8; 68];
    let second = [0x55u8; 68];
    layout.write_element(&mut memory, 0, &first);
    layout.write_element(&mut memory, 1, &second);

    assert_eq!(layout.element_offset(1), 128);
    assert_eq!(layout.element_bytes(&memory, 1), &second[..]);
    assert_eq!(layout.element_bytes(&memory, 0), &first[..]);
    // Padding between the elements stays untouched.
    assert!(memory[68..128].iter().all(|&b| b == 0));
}

#[test]
fn test_index_span_reads_back_what_was_written() {
    let layout = BufferLayout::new(68, 2, 64);
    let mut memory = vec![0u8; layout.total_size() as usize];
    let payloads = [[0x11u8; 68], [0x22u8; 68]];
    for (index, payload) in payloads.iter().enumerate() {
        layout.write_element(&mut memory, index as u32, payload);
    }

    // The same span backs descriptor_info_for_index and flush_index.
    let (offset, size) = layout.index_span(1);
    assert_eq!((offset, size), (128, 128));
    let start = offset as usize;
    assert_eq!(&memory[start..start + 68], &payloads[1][..]);
    assert!(memory[start + 68..start + size as usize].iter().all(|&b| b == 0));

    let (offset, size) = layout.index_span(0);
    assert_eq!((offset, size), (0, 128));
    assert_eq!(&memory[..68], &payloads[0][..]);
}

#[test]
fn test_writes_never_leave_their_span() {
    let layout = BufferLayout::new(20, 4, 16);
    let mut memory = vec![0u8; layout.total_size() as usize];
    for index in 0..4 {
        let before = memory.clone();
        layout.write_element(&mut memory, index, &[index as u8 + 1; 20]);
        let span = layout.element_range(index);
        for (i, (old, new)) in before.iter().zip(&memory).enumerate() {
            if !span.contains(&i) {
                assert_eq!(old, new, "byte {i} outside element {index} changed");
            }
        }
    }
}

#[test]
fn test_alignment_properties() {
    for size in [1u64, 3, 64, 65, 68, 200, 4096] {
        for shift in 0..9 {
            let min = 1u64 << shift;
            let aligned = align(size, min);
            assert!(aligned >= size);
            assert_eq!(aligned % min, 0);
        }
        assert_eq!(align(size, 0), size);
    }
}
