use super::*;

#[test]
fn no_resources_refuses_binding() {
    let mut b = NoResources;
    assert!(matches!(b.create(16, 16), Err(TexError::Resource(_))));
    assert!(b.upload(ResourceId(1), &[], 16, 16).is_err());
    assert!(b.release(ResourceId(1)).is_ok());
}

#[test]
fn in_memory_tracks_uploads_and_releases() {
    let mut b = InMemoryResources::new();
    let id = b.create(16, 16).unwrap();
    let other = b.create(32, 16).unwrap();
    assert_ne!(id, other);

    let texels = vec![Texel::splat(0.5); 256];
    b.upload(id, &texels, 16, 16).unwrap();
    b.upload(id, &texels, 16, 16).unwrap();
    let stored = b.get(id).unwrap();
    assert_eq!(stored.uploads, 2);
    assert_eq!(stored.texels, texels);

    b.release(id).unwrap();
    assert!(b.get(id).is_none());
    assert_eq!(b.released, vec![id]);
    assert!(b.upload(id, &texels, 16, 16).is_err());
}

#[test]
fn upload_with_wrong_dimensions_fails() {
    let mut b = InMemoryResources::new();
    let id = b.create(16, 16).unwrap();
    assert!(b.upload(id, &[], 32, 16).is_err());
    assert_eq!(b.get(id).unwrap().uploads, 0);
}

#[test]
fn evict_drops_without_recording_a_release() {
    let mut b = InMemoryResources::new();
    let id = b.create(16, 16).unwrap();
    assert!(b.evict(id));
    assert!(!b.evict(id));
    assert!(b.released.is_empty());
}
